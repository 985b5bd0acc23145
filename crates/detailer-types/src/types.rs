//! Core records shared by every layer

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Monetary amount in whole-or-fractional currency units
pub type Money = f64;

/// Vehicle class, the base-price lookup key
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Sedan,
    Suv,
    Truck,
    Van,
    Sports,
    Luxury,
}

impl VehicleClass {
    /// Every class, in embedding order
    pub const ALL: [VehicleClass; 6] = [
        VehicleClass::Sedan,
        VehicleClass::Suv,
        VehicleClass::Truck,
        VehicleClass::Van,
        VehicleClass::Sports,
        VehicleClass::Luxury,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleClass::Sedan => "sedan",
            VehicleClass::Suv => "suv",
            VehicleClass::Truck => "truck",
            VehicleClass::Van => "van",
            VehicleClass::Sports => "sports",
            VehicleClass::Luxury => "luxury",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            VehicleClass::Sedan => "Sedan",
            VehicleClass::Suv => "SUV",
            VehicleClass::Truck => "Truck",
            VehicleClass::Van => "Van",
            VehicleClass::Sports => "Sports",
            VehicleClass::Luxury => "Luxury",
        }
    }

    /// Position within [`VehicleClass::ALL`]
    pub fn index(&self) -> usize {
        match self {
            VehicleClass::Sedan => 0,
            VehicleClass::Suv => 1,
            VehicleClass::Truck => 2,
            VehicleClass::Van => 3,
            VehicleClass::Sports => 4,
            VehicleClass::Luxury => 5,
        }
    }

    /// Classes that attract the luxury surcharge
    pub fn is_premium(&self) -> bool {
        matches!(self, VehicleClass::Luxury | VehicleClass::Sports)
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        VehicleClass::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| Error::InvalidInput(format!("unknown vehicle class: {}", s)))
    }
}

/// Optional service offered on top of the base price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub name: String,
    pub price: Money,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ServiceItem {
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            name: name.into(),
            price,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Percentage surcharges
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Surcharges {
    /// Applied to luxury and sports vehicles (percent)
    pub luxury_surcharge: f64,
    /// Scaled by how dirty the worse side of the vehicle is (percent)
    pub filthiness_factor: f64,
}

/// The tunable pricing configuration consumed by the estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingModel {
    pub base_price: BTreeMap<VehicleClass, Money>,
    pub surcharges: Surcharges,
    pub services: BTreeMap<String, ServiceItem>,
    pub labor_cost: Money,
    pub material_cost: Money,
}

impl Default for PricingModel {
    fn default() -> Self {
        let base_price = [
            (VehicleClass::Sedan, 50.0),
            (VehicleClass::Suv, 70.0),
            (VehicleClass::Truck, 80.0),
            (VehicleClass::Van, 75.0),
            (VehicleClass::Sports, 90.0),
            (VehicleClass::Luxury, 100.0),
        ]
        .into_iter()
        .collect();

        let services = [
            ("interiorCleaning", ServiceItem::new("Interior Cleaning", 30.0)),
            ("exteriorCleaning", ServiceItem::new("Exterior Cleaning", 40.0)),
            ("waxing", ServiceItem::new("Waxing", 50.0)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            base_price,
            surcharges: Surcharges {
                luxury_surcharge: 20.0,
                filthiness_factor: 10.0,
            },
            services,
            labor_cost: 25.0,
            material_cost: 10.0,
        }
    }
}

impl PricingModel {
    /// Base price for a class, 0 when the class is missing
    pub fn base_price_for(&self, class: VehicleClass) -> Money {
        self.base_price.get(&class).copied().unwrap_or(0.0)
    }

    /// Catalog price of a service, 0 when the key is unknown
    pub fn service_price(&self, key: &str) -> Money {
        self.services.get(key).map(|s| s.price).unwrap_or(0.0)
    }

    /// Price of a service only if it exists and is enabled
    pub fn enabled_service_price(&self, key: &str) -> Option<Money> {
        self.services
            .get(key)
            .filter(|s| s.enabled)
            .map(|s| s.price)
    }
}

/// The persisted pricing model record with its optimistic-concurrency version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionedPricingModel {
    /// Starts at 1, incremented on every successful replace
    pub version: u64,
    pub model: PricingModel,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_by: String,
}

/// Structured result from the external vehicle analysis service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleAnalysis {
    #[serde(default)]
    pub body_type: String,
    #[serde(default)]
    pub damage_areas: Vec<String>,
    #[serde(default)]
    pub cleanliness_level: String,
    #[serde(default)]
    pub recommended_services: Vec<String>,
    /// Confidence score (0.0 - 1.0)
    #[serde(default)]
    pub confidence_score: f64,
}

/// One priced detailing job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Identity of the submitting user
    pub owner_id: String,
    #[serde(default)]
    pub client_name: String,
    /// Image references held by the external object store
    #[serde(default)]
    pub images: Vec<String>,
    pub vehicle_class: VehicleClass,
    /// 0-100, 100 = pristine
    pub interior_condition: u8,
    /// 0-100, 100 = pristine
    pub exterior_condition: u8,
    #[serde(default)]
    pub description: String,
    /// Selected service keys
    #[serde(default)]
    pub services: Vec<String>,
    /// Locked in at creation from the model in force at that moment
    pub estimated_price: i64,
    /// Realized price, recorded once after the job is paid
    #[serde(default)]
    pub actual_price: Option<Money>,
    #[serde(default)]
    pub actual_recorded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default)]
    pub analysis: Option<VehicleAnalysis>,
    #[serde(default)]
    pub analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Input collected by a self-assessment form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSubmission {
    pub client_name: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub vehicle_class: VehicleClass,
    pub interior_condition: i32,
    pub exterior_condition: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub services: Vec<String>,
}

/// Estimate-vs-actual accuracy over a set of assessments
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracySnapshot {
    /// Percentage of accurate assessments (0-100)
    pub accuracy: f64,
    pub total_assessments: usize,
    pub accurate_assessments: usize,
}

/// Trend label attached to an insight topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "increasing"),
            Trend::Decreasing => write!(f, "decreasing"),
            Trend::Stable => write!(f, "stable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendInsight {
    pub trend: Trend,
    pub suggestion: String,
}

/// Pricing-model tuning suggestions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveInsights {
    pub recommendations: Vec<String>,
    pub trend_analysis: BTreeMap<String, TrendInsight>,
}

impl PredictiveInsights {
    pub fn is_empty(&self) -> bool {
        self.recommendations.is_empty() && self.trend_analysis.is_empty()
    }
}

/// Revenue summary over a trailing window
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingAnalytics {
    pub total_revenue: Money,
    pub average_order_value: Money,
    /// Up to three most frequently selected service keys
    pub popular_services: Vec<String>,
    pub assessment_count: usize,
    pub window_days: u32,
}

/// Which retrieval strategy the similarity matcher uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMethod {
    /// Same class, both conditions within a fixed tolerance
    #[default]
    Threshold,
    /// Nearest feature vectors across all classes
    Embedding,
}

impl std::fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMethod::Threshold => write!(f, "threshold"),
            SimilarityMethod::Embedding => write!(f, "embedding"),
        }
    }
}

/// A matched past assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarAssessment {
    pub assessment: Assessment,
    /// Feature-space distance; absent for threshold matches
    #[serde(default)]
    pub distance: Option<f64>,
}

/// Capability level granted by the identity provider
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Operator,
    Customer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Operator => write!(f, "operator"),
            Role::Customer => write!(f, "customer"),
        }
    }
}

/// The authenticated principal behind a call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub subject: String,
    pub role: Role,
}

impl Caller {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    pub fn admin(subject: impl Into<String>) -> Self {
        Self::new(subject, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
