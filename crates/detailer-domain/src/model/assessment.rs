//! Assessment invariants: condition ranges and write-once fields

use chrono::{DateTime, Utc};
use detailer_types::{Assessment, Error, Money, Result, VehicleAnalysis};

pub const MIN_CONDITION: i32 = 0;
pub const MAX_CONDITION: i32 = 100;

/// Check a condition score and narrow it to its stored width
pub fn validate_condition(field: &str, value: i32) -> Result<u8> {
    if (MIN_CONDITION..=MAX_CONDITION).contains(&value) {
        Ok(value as u8)
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be between {} and {} (got {})",
            field, MIN_CONDITION, MAX_CONDITION, value
        )))
    }
}

/// Record the realized price. Allowed exactly once.
pub fn apply_actual_price(
    assessment: &mut Assessment,
    actual_price: Money,
    at: DateTime<Utc>,
) -> Result<()> {
    if !actual_price.is_finite() || actual_price < 0.0 {
        return Err(Error::InvalidInput(format!(
            "actual price must be a non-negative number (got {})",
            actual_price
        )));
    }
    if assessment.actual_price.is_some() {
        return Err(Error::AlreadyRecorded {
            id: assessment.id.clone(),
            field: "actualPrice",
        });
    }
    assessment.actual_price = Some(actual_price);
    assessment.actual_recorded_at = Some(at);
    Ok(())
}

/// Attach the external analysis result. Allowed exactly once.
pub fn apply_analysis(
    assessment: &mut Assessment,
    analysis: VehicleAnalysis,
    at: DateTime<Utc>,
) -> Result<()> {
    if !(0.0..=1.0).contains(&analysis.confidence_score) {
        return Err(Error::InvalidInput(format!(
            "confidence score must be within [0, 1] (got {})",
            analysis.confidence_score
        )));
    }
    if assessment.analysis.is_some() {
        return Err(Error::AlreadyRecorded {
            id: assessment.id.clone(),
            field: "analysis",
        });
    }
    assessment.analysis = Some(analysis);
    assessment.analyzed_at = Some(at);
    Ok(())
}
