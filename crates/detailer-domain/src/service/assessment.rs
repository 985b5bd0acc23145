//! Turning a submitted self-assessment into a priced record

use chrono::{DateTime, Utc};
use detailer_types::{Assessment, AssessmentSubmission, Error, PricingModel, Result};

use crate::model::validate_condition;
use crate::service::embedding::feature_vector;
use crate::service::estimator::estimate_price;

pub const MAX_CLIENT_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Validate a submission and price it with `model`.
///
/// The estimate is computed once here and never recalculated afterwards.
pub fn build_assessment(
    id: String,
    owner_id: &str,
    submission: &AssessmentSubmission,
    model: &PricingModel,
    created_at: DateTime<Utc>,
) -> Result<Assessment> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(Error::InvalidInput("owner identity is required".to_string()));
    }

    let client_name = submission.client_name.trim().to_string();
    let name_len = client_name.chars().count();
    if name_len == 0 || name_len > MAX_CLIENT_NAME_LEN {
        return Err(Error::InvalidInput(format!(
            "client name must be 1-{} characters",
            MAX_CLIENT_NAME_LEN
        )));
    }

    let description = submission.description.trim().to_string();
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(Error::InvalidInput(format!(
            "description must be at most {} characters",
            MAX_DESCRIPTION_LEN
        )));
    }

    let images: Vec<String> = submission
        .images
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .map(str::to_string)
        .collect();
    if images.is_empty() {
        return Err(Error::InvalidInput(
            "at least one image reference is required".to_string(),
        ));
    }

    let interior = validate_condition("interiorCondition", submission.interior_condition)?;
    let exterior = validate_condition("exteriorCondition", submission.exterior_condition)?;

    let mut services: Vec<String> = Vec::new();
    for key in &submission.services {
        let key = key.trim();
        if !key.is_empty() && !services.iter().any(|s| s == key) {
            services.push(key.to_string());
        }
    }

    let estimated_price = estimate_price(
        submission.vehicle_class,
        submission.interior_condition,
        submission.exterior_condition,
        &services,
        model,
    )?;

    Ok(Assessment {
        id,
        owner_id: owner_id.to_string(),
        client_name,
        images,
        vehicle_class: submission.vehicle_class,
        interior_condition: interior,
        exterior_condition: exterior,
        description,
        services,
        estimated_price,
        actual_price: None,
        actual_recorded_at: None,
        embedding: Some(feature_vector(submission.vehicle_class, interior, exterior)),
        analysis: None,
        analyzed_at: None,
        created_at,
    })
}
