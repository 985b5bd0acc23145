//! Assessment Service - submissions, realized prices and history

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use detailer_domain::repository::{AssessmentRepository, PricingModelRepository};
use detailer_domain::service::build_assessment;
use detailer_types::{
    Assessment, AssessmentSubmission, Caller, Error, Money, Result, VehicleClass,
};

/// Narrowing applied to the assessment history
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub owner_id: Option<String>,
    pub vehicle_class: Option<VehicleClass>,
    /// Only assessments still waiting for their realized price
    pub pending_only: bool,
    pub limit: Option<usize>,
}

impl HistoryFilter {
    pub fn for_owner(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: Some(owner_id.into()),
            ..Default::default()
        }
    }

    fn matches(&self, assessment: &Assessment) -> bool {
        self.owner_id
            .as_deref()
            .map_or(true, |owner| assessment.owner_id == owner)
            && self
                .vehicle_class
                .map_or(true, |class| assessment.vehicle_class == class)
            && (!self.pending_only || assessment.actual_price.is_none())
    }
}

#[derive(Clone)]
pub struct AssessmentService {
    models: Arc<dyn PricingModelRepository>,
    assessments: Arc<dyn AssessmentRepository>,
}

impl AssessmentService {
    pub fn new(
        models: Arc<dyn PricingModelRepository>,
        assessments: Arc<dyn AssessmentRepository>,
    ) -> Self {
        Self {
            models,
            assessments,
        }
    }

    /// Price a customer's self-assessment with the model in force and store it.
    ///
    /// The model is read once; a replacement landing afterwards does not
    /// change the stored estimate.
    pub fn submit(&self, caller: &Caller, submission: &AssessmentSubmission) -> Result<Assessment> {
        let record = self.models.current()?.ok_or(Error::ModelNotFound)?;
        let assessment = build_assessment(
            Uuid::new_v4().to_string(),
            &caller.subject,
            submission,
            &record.model,
            Utc::now(),
        )?;
        self.assessments.append(&assessment)?;
        info!(
            id = %assessment.id,
            owner = %assessment.owner_id,
            model_version = record.version,
            "assessment submitted"
        );
        Ok(assessment)
    }

    /// Record what the job was actually billed. Allowed once per assessment.
    pub fn record_actual_price(&self, id: &str, actual_price: Money) -> Result<Assessment> {
        self.assessments
            .record_actual_price(id, actual_price, Utc::now())
    }

    pub fn get(&self, id: &str) -> Result<Assessment> {
        self.assessments
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    /// Assessments matching `filter`, newest first
    pub fn history(&self, filter: &HistoryFilter) -> Result<Vec<Assessment>> {
        let source = match (&filter.owner_id, filter.vehicle_class) {
            (Some(owner), _) => self.assessments.find_by_owner(owner)?,
            (None, Some(class)) => self.assessments.find_by_class(class)?,
            (None, None) => self.assessments.find_all()?,
        };
        let matching = source.into_iter().filter(|a| filter.matches(a));
        Ok(match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }
}
