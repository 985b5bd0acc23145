//! Price estimation
//!
//! The quote is a pure function of vehicle class, condition scores, selected
//! services and the pricing model. It is locked into each assessment at
//! creation, so the arithmetic below must stay stable across releases.

use detailer_types::{Error, Money, PricingModel, Result, VehicleClass};
use serde::Serialize;

use crate::model::validate_condition;

/// Every intermediate value of a quote
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub vehicle_class: VehicleClass,
    pub base_price: Money,
    pub interior_factor: f64,
    pub exterior_factor: f64,
    /// Base price after both condition factors
    pub conditioned_price: Money,
    /// Enabled, known services that were added
    pub applied_services: Vec<(String, Money)>,
    /// Selected keys that were unknown or disabled
    pub ignored_services: Vec<String>,
    pub services_total: Money,
    /// 1.0 when no luxury surcharge applies
    pub luxury_multiplier: f64,
    /// 1.0 when no filthiness surcharge applies
    pub filthiness_multiplier: f64,
    pub unrounded_total: f64,
    pub total: i64,
}

/// `1 + (100 - condition) / 100`, in [1.0, 2.0]
pub fn condition_factor(condition: u8) -> f64 {
    1.0 + (100.0 - f64::from(condition)) / 100.0
}

/// Quote a job, returning only the rounded price
pub fn estimate_price<S: AsRef<str>>(
    vehicle_class: VehicleClass,
    interior_condition: i32,
    exterior_condition: i32,
    selected_services: &[S],
    model: &PricingModel,
) -> Result<i64> {
    price_breakdown(
        vehicle_class,
        interior_condition,
        exterior_condition,
        selected_services,
        model,
    )
    .map(|b| b.total)
}

/// Quote a job and keep the intermediate values
pub fn price_breakdown<S: AsRef<str>>(
    vehicle_class: VehicleClass,
    interior_condition: i32,
    exterior_condition: i32,
    selected_services: &[S],
    model: &PricingModel,
) -> Result<PriceBreakdown> {
    let interior = validate_condition("interiorCondition", interior_condition)?;
    let exterior = validate_condition("exteriorCondition", exterior_condition)?;

    let base_price = model.base_price_for(vehicle_class);
    let interior_factor = condition_factor(interior);
    let exterior_factor = condition_factor(exterior);

    let conditioned_price = base_price * (interior_factor * exterior_factor);
    let mut price = conditioned_price;

    let mut applied_services = Vec::new();
    let mut ignored_services = Vec::new();
    for key in selected_services {
        let key = key.as_ref();
        match model.enabled_service_price(key) {
            Some(service_price) => {
                price += service_price;
                applied_services.push((key.to_string(), service_price));
            }
            None => ignored_services.push(key.to_string()),
        }
    }
    let services_total: Money = applied_services.iter().map(|(_, p)| p).sum();

    let mut luxury_multiplier = 1.0;
    let luxury_surcharge = model.surcharges.luxury_surcharge;
    if vehicle_class.is_premium() && luxury_surcharge > 0.0 {
        luxury_multiplier = 1.0 + luxury_surcharge / 100.0;
        price *= luxury_multiplier;
    }

    let mut filthiness_multiplier = 1.0;
    let filthiness_factor = model.surcharges.filthiness_factor;
    if filthiness_factor > 0.0 {
        let filthiness = (100.0 - f64::from(interior.min(exterior))) / 100.0;
        filthiness_multiplier = 1.0 + filthiness * filthiness_factor / 100.0;
        price *= filthiness_multiplier;
    }

    if !price.is_finite() {
        return Err(Error::InvalidInput(format!(
            "pricing model produced a non-finite price for {}",
            vehicle_class
        )));
    }

    Ok(PriceBreakdown {
        vehicle_class,
        base_price,
        interior_factor,
        exterior_factor,
        conditioned_price,
        applied_services,
        ignored_services,
        services_total,
        luxury_multiplier,
        filthiness_multiplier,
        unrounded_total: price,
        // Prices are non-negative, so half-away-from-zero is half-up here.
        total: price.round() as i64,
    })
}
