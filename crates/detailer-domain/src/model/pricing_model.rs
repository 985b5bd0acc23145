//! Pricing model validation
//!
//! Every violation is collected before failing so an operator can fix the
//! whole model in one round trip.

use chrono::{DateTime, Utc};
use detailer_types::{
    Error, FieldViolation, PricingModel, Result, VehicleClass, VersionedPricingModel,
};

/// Validate a pricing model before it is written
pub fn validate_pricing_model(model: &PricingModel) -> Result<()> {
    let violations = collect_violations(model);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(violations))
    }
}

/// List every field of `model` that breaks an invariant
pub fn collect_violations(model: &PricingModel) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    for class in VehicleClass::ALL {
        let field = format!("basePrice.{}", class);
        match model.base_price.get(&class) {
            None => violations.push(FieldViolation::new(field, "missing vehicle class")),
            Some(price) => check_amount(&mut violations, field, *price),
        }
    }

    check_amount(
        &mut violations,
        "surcharges.luxurySurcharge".to_string(),
        model.surcharges.luxury_surcharge,
    );
    check_amount(
        &mut violations,
        "surcharges.filthinessFactor".to_string(),
        model.surcharges.filthiness_factor,
    );

    for (key, service) in &model.services {
        if key.trim().is_empty() {
            violations.push(FieldViolation::new("services", "service key must not be empty"));
        }
        if service.name.trim().is_empty() {
            violations.push(FieldViolation::new(
                format!("services.{}.name", key),
                "must not be empty",
            ));
        }
        check_amount(&mut violations, format!("services.{}.price", key), service.price);
    }

    check_amount(&mut violations, "laborCost".to_string(), model.labor_cost);
    check_amount(&mut violations, "materialCost".to_string(), model.material_cost);

    violations
}

/// Build the record that replaces `current`, provided the caller read the
/// version that is still stored.
pub fn next_version(
    current: Option<&VersionedPricingModel>,
    expected_version: Option<u64>,
    model: PricingModel,
    updated_by: &str,
    updated_at: DateTime<Utc>,
) -> Result<VersionedPricingModel> {
    let actual = current.map(|c| c.version);
    if actual != expected_version {
        return Err(Error::Conflict {
            expected: expected_version,
            actual,
        });
    }
    Ok(VersionedPricingModel {
        version: actual.unwrap_or(0) + 1,
        model,
        updated_at,
        updated_by: updated_by.to_string(),
    })
}

fn check_amount(violations: &mut Vec<FieldViolation>, field: String, value: f64) {
    if !value.is_finite() {
        violations.push(FieldViolation::new(field, "must be a finite number"));
    } else if value < 0.0 {
        violations.push(FieldViolation::new(
            field,
            format!("must be non-negative (got {})", value),
        ));
    }
}
