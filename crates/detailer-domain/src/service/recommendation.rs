//! Pricing recommendations from an owner's recent history
//!
//! Advisory only: an owner without history yields empty insights rather than
//! an error.

use std::collections::BTreeMap;

use detailer_types::{
    Assessment, Error, Money, PredictiveInsights, PricingModel, Result, Trend, TrendInsight,
};

/// Topic key of the fixed trend entry
pub const PRICING_TREND_TOPIC: &str = "pricing";

const STABLE_PRICING_SUGGESTION: &str = "Current pricing model is performing well.";

/// Above-average services are tightened by 5%, the rest grow by 5%
pub fn suggest_service_price(price: Money, average: Money) -> i64 {
    if price > average {
        (price * 0.95).floor() as i64
    } else {
        (price * 1.05).ceil() as i64
    }
}

pub fn recommendation_message(service: &str, suggested_price: i64) -> String {
    format!(
        "Adjust price for {} to ${} to stay competitive.",
        service, suggested_price
    )
}

/// Build insights from the most recent assessment in `assessments`.
///
/// History is checked before the model, so an unconfigured system still
/// answers an owner with no history.
pub fn generate_insights(
    model: Option<&PricingModel>,
    assessments: &[Assessment],
) -> Result<PredictiveInsights> {
    let Some(latest) = assessments.iter().max_by_key(|a| a.created_at) else {
        return Ok(PredictiveInsights::default());
    };
    let model = model.ok_or(Error::ModelNotFound)?;

    let mut service_keys: Vec<&str> = Vec::new();
    for key in &latest.services {
        if !service_keys.contains(&key.as_str()) {
            service_keys.push(key);
        }
    }

    // Unknown keys price at 0 so they surface for review.
    let prices: Vec<(&str, Money)> = service_keys
        .iter()
        .map(|key| (*key, model.service_price(key)))
        .collect();

    let average = if prices.is_empty() {
        0.0
    } else {
        prices.iter().map(|(_, p)| p).sum::<Money>() / prices.len() as f64
    };

    let recommendations = prices
        .iter()
        .map(|(key, price)| recommendation_message(key, suggest_service_price(*price, average)))
        .collect();

    let mut trend_analysis = BTreeMap::new();
    trend_analysis.insert(
        PRICING_TREND_TOPIC.to_string(),
        TrendInsight {
            trend: Trend::Stable,
            suggestion: STABLE_PRICING_SUGGESTION.to_string(),
        },
    );

    Ok(PredictiveInsights {
        recommendations,
        trend_analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::assessment::fixtures::assessment;
    use detailer_types::{ServiceItem, VehicleClass};

    fn model_with(services: &[(&str, f64)]) -> PricingModel {
        let mut model = PricingModel::default();
        model.services = services
            .iter()
            .map(|(k, p)| (k.to_string(), ServiceItem::new(*k, *p)))
            .collect();
        model
    }

    fn with_services(mut a: Assessment, services: &[&str]) -> Assessment {
        a.services = services.iter().map(|s| s.to_string()).collect();
        a
    }

    #[test]
    fn test_no_history_yields_empty_insights_even_without_model() {
        let insights = generate_insights(None, &[]).unwrap();
        assert!(insights.recommendations.is_empty());
        assert!(insights.trend_analysis.is_empty());
    }

    #[test]
    fn test_history_without_model_fails() {
        let a = assessment("a", VehicleClass::Sedan, 50, 50, 0);
        assert!(matches!(
            generate_insights(None, &[a]),
            Err(Error::ModelNotFound)
        ));
    }

    #[test]
    fn test_wash_and_wax_scenario() {
        let model = model_with(&[("wash", 20.0), ("wax", 40.0)]);
        let a = with_services(
            assessment("a", VehicleClass::Sedan, 50, 50, 0),
            &["wash", "wax"],
        );

        let insights = generate_insights(Some(&model), &[a]).unwrap();
        assert_eq!(
            insights.recommendations,
            vec![
                "Adjust price for wash to $21 to stay competitive.",
                "Adjust price for wax to $38 to stay competitive.",
            ]
        );
        let pricing = &insights.trend_analysis[PRICING_TREND_TOPIC];
        assert_eq!(pricing.trend, Trend::Stable);
        assert_eq!(pricing.suggestion, "Current pricing model is performing well.");
    }

    #[test]
    fn test_uses_most_recent_assessment() {
        let model = model_with(&[("wash", 20.0), ("wax", 40.0)]);
        let older = with_services(assessment("old", VehicleClass::Sedan, 50, 50, 0), &["wax"]);
        let newer = with_services(assessment("new", VehicleClass::Sedan, 50, 50, 30), &["wash"]);

        let insights = generate_insights(Some(&model), &[older, newer]).unwrap();
        assert_eq!(
            insights.recommendations,
            vec!["Adjust price for wash to $21 to stay competitive."]
        );
    }

    #[test]
    fn test_unknown_service_priced_at_zero() {
        let model = model_with(&[("wash", 20.0)]);
        let a = with_services(
            assessment("a", VehicleClass::Sedan, 50, 50, 0),
            &["wash", "retired"],
        );
        let insights = generate_insights(Some(&model), &[a]).unwrap();
        // average 10: wash is above (floor 19), retired is below (ceil 0)
        assert_eq!(
            insights.recommendations,
            vec![
                "Adjust price for wash to $19 to stay competitive.",
                "Adjust price for retired to $0 to stay competitive.",
            ]
        );
    }

    #[test]
    fn test_assessment_without_services_keeps_trend_entry() {
        let model = PricingModel::default();
        let a = assessment("a", VehicleClass::Van, 50, 50, 0);
        let insights = generate_insights(Some(&model), &[a]).unwrap();
        assert!(insights.recommendations.is_empty());
        assert!(insights.trend_analysis.contains_key(PRICING_TREND_TOPIC));
    }

    #[test]
    fn test_equal_prices_all_grow() {
        assert_eq!(suggest_service_price(30.0, 30.0), 32);
        assert_eq!(suggest_service_price(50.0, 30.0), 47);
    }
}
