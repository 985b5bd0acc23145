//! Output formatting module

use std::collections::BTreeMap;

use serde::Serialize;

use detailer_domain::service::accuracy::AccuracySample;
use detailer_domain::service::PriceBreakdown;
use detailer_types::{
    AccuracySnapshot, Assessment, OutputFormat, PredictiveInsights, PricingAnalytics, Result,
    SimilarAssessment, SimilarityMethod, VehicleClass, VersionedPricingModel,
};

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    println!("{}", content);
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

fn money(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Quote {
    vehicle_class: VehicleClass,
    estimated_price: i64,
}

pub fn output_quote(output_format: OutputFormat, class: VehicleClass, price: i64) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&Quote {
            vehicle_class: class,
            estimated_price: price,
        });
    }
    println!("Estimated price ({}): ${}", class.label(), price);
    Ok(())
}

pub fn output_breakdown(output_format: OutputFormat, b: &PriceBreakdown) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(b);
    }

    println!("\nPrice Breakdown");
    println!("===============");
    println!("Vehicle class:     {}", b.vehicle_class.label());
    println!("Base price:        {:>10.2}", b.base_price);
    println!("Interior factor:   {:>10.2}", b.interior_factor);
    println!("Exterior factor:   {:>10.2}", b.exterior_factor);
    println!("After condition:   {:>10.2}", b.conditioned_price);
    for (key, price) in &b.applied_services {
        println!("  + {:<15} {:>10.2}", truncate(key, 15), price);
    }
    if !b.ignored_services.is_empty() {
        println!("  (ignored: {})", b.ignored_services.join(", "));
    }
    println!("Services total:    {:>10.2}", b.services_total);
    if b.luxury_multiplier != 1.0 {
        println!("Luxury surcharge:  {:>10.3}x", b.luxury_multiplier);
    }
    if b.filthiness_multiplier != 1.0 {
        println!("Filthiness:        {:>10.3}x", b.filthiness_multiplier);
    }
    println!("-------------------------------");
    println!("Unrounded:         {:>10.2}", b.unrounded_total);
    println!("Total:             {:>10}", b.total);
    Ok(())
}

pub fn output_assessment(output_format: OutputFormat, a: &Assessment) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(a);
    }

    println!("\nAssessment {}", a.id);
    println!("===========");
    println!("Client:          {}", a.client_name);
    println!("Owner:           {}", a.owner_id);
    println!("Vehicle class:   {}", a.vehicle_class.label());
    println!("Interior:        {}/100", a.interior_condition);
    println!("Exterior:        {}/100", a.exterior_condition);
    if !a.services.is_empty() {
        println!("Services:        {}", a.services.join(", "));
    }
    println!("Images:          {}", a.images.len());
    if !a.description.is_empty() {
        println!("Description:     {}", a.description);
    }
    println!("Estimated price: ${}", a.estimated_price);
    println!("Actual price:    {}", money(a.actual_price));
    println!("Created:         {}", a.created_at.format("%Y-%m-%d %H:%M"));

    if let Some(ref analysis) = a.analysis {
        println!("\n--- Vehicle Analysis ---");
        println!("Body type:       {}", analysis.body_type);
        println!("Cleanliness:     {}", analysis.cleanliness_level);
        if !analysis.damage_areas.is_empty() {
            println!("Damage:          {}", analysis.damage_areas.join(", "));
        }
        if !analysis.recommended_services.is_empty() {
            println!("Recommended:     {}", analysis.recommended_services.join(", "));
        }
        println!("Confidence:      {:.0}%", analysis.confidence_score * 100.0);
    }
    Ok(())
}

pub fn output_feedback(output_format: OutputFormat, a: &Assessment) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(a);
    }

    println!("Feedback recorded:");
    println!("  Assessment: {}", a.id);
    println!("  Estimated:  ${}", a.estimated_price);
    println!("  Actual:     {}", money(a.actual_price));
    if let Some(actual) = a.actual_price.filter(|v| *v > 0.0) {
        let error = a.estimated_price as f64 - actual;
        println!(
            "  Error:      {:+.2} ({:+.1}%)",
            error,
            error / actual * 100.0
        );
    }
    Ok(())
}

pub fn output_history(output_format: OutputFormat, entries: &[Assessment]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(entries);
    }

    println!("Assessment History");
    println!("==================");
    if entries.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    println!(
        "{:<36} {:<18} {:<8} {:>4} {:>4} {:>8} {:>9} {:>16}",
        "Id", "Client", "Class", "Int", "Ext", "Est.", "Actual", "Date"
    );
    println!("{}", "-".repeat(110));
    for a in entries {
        println!(
            "{:<36} {:<18} {:<8} {:>4} {:>4} {:>8} {:>9} {:>16}",
            a.id,
            truncate(&a.client_name, 18),
            a.vehicle_class.as_str(),
            a.interior_condition,
            a.exterior_condition,
            a.estimated_price,
            money(a.actual_price),
            a.created_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub fn output_model(output_format: OutputFormat, record: &VersionedPricingModel) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(record);
    }

    let model = &record.model;
    println!("\nPricing Model v{}", record.version);
    println!("================");
    println!(
        "Updated {} by {}",
        record.updated_at.format("%Y-%m-%d %H:%M"),
        record.updated_by
    );

    println!("\nBase prices:");
    for (class, price) in &model.base_price {
        println!("  {:<12} {:>10.2}", class.label(), price);
    }

    println!("\nSurcharges:");
    println!("  Luxury/sports  {:>8.1}%", model.surcharges.luxury_surcharge);
    println!("  Filthiness     {:>8.1}%", model.surcharges.filthiness_factor);

    println!("\nServices:");
    if model.services.is_empty() {
        println!("  (none)");
    }
    for (key, service) in &model.services {
        println!(
            "  {:<20} {:<24} {:>8.2}{}",
            truncate(key, 20),
            truncate(&service.name, 24),
            service.price,
            if service.enabled { "" } else { "  (disabled)" }
        );
    }

    println!("\nLabor cost:      {:.2}", model.labor_cost);
    println!("Material cost:   {:.2}", model.material_cost);
    Ok(())
}

pub fn output_insights(
    output_format: OutputFormat,
    owner: &str,
    insights: &PredictiveInsights,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(insights);
    }

    println!("Pricing Insights for {}", owner);
    println!("=====================");
    if insights.is_empty() {
        println!("No assessments yet; nothing to suggest.");
        return Ok(());
    }
    for recommendation in &insights.recommendations {
        println!("  - {}", recommendation);
    }
    if !insights.trend_analysis.is_empty() {
        println!("\nTrends:");
        for (topic, trend) in &insights.trend_analysis {
            println!("  {:<10} {:<11} {}", topic, trend.trend, trend.suggestion);
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccuracyReport<'a> {
    overall: &'a AccuracySnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    by_class: Option<&'a BTreeMap<VehicleClass, AccuracySnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<&'a [AccuracySample]>,
}

fn print_snapshot(label: &str, s: &AccuracySnapshot) {
    println!(
        "{:<12} {:>6.1}%  ({} of {} within 10%)",
        label, s.accuracy, s.accurate_assessments, s.total_assessments
    );
}

pub fn output_accuracy(
    output_format: OutputFormat,
    overall: &AccuracySnapshot,
    by_class: Option<&BTreeMap<VehicleClass, AccuracySnapshot>>,
    samples: Option<&[AccuracySample]>,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&AccuracyReport {
            overall,
            by_class,
            samples,
        });
    }

    println!("Accuracy Report");
    println!("===============");
    println!();
    if overall.total_assessments == 0 {
        println!("No assessments available.");
        return Ok(());
    }
    print_snapshot("Overall", overall);

    if let Some(grouped) = by_class {
        println!();
        println!("By Vehicle Class");
        println!("----------------");
        for (class, snapshot) in grouped {
            print_snapshot(class.label(), snapshot);
        }
    }

    if let Some(samples) = samples {
        println!();
        println!("Detailed Samples");
        println!("----------------");
        println!(
            "{:<36} {:<8} {:>10} {:>10} {:>10} {:>8}",
            "Assessment", "Class", "Estimated", "Actual", "Error", "Error%"
        );
        println!("{}", "-".repeat(87));
        for sample in samples {
            println!(
                "{:<36} {:<8} {:>10} {:>10.2} {:>+10.2} {:>+7.1}%",
                sample.assessment_id,
                sample.vehicle_class.as_str(),
                sample.estimated,
                sample.actual,
                sample.error(),
                sample.percent_error()
            );
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SimilarReport<'a> {
    method: SimilarityMethod,
    matches: &'a [SimilarAssessment],
}

pub fn output_similar(
    output_format: OutputFormat,
    method: SimilarityMethod,
    matches: &[SimilarAssessment],
) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&SimilarReport { method, matches });
    }

    println!("Similar Assessments ({})", method);
    println!("===================");
    if matches.is_empty() {
        println!("No similar assessments found.");
        return Ok(());
    }
    println!(
        "{:<36} {:<8} {:>4} {:>4} {:>8} {:>9} {:>9}",
        "Id", "Class", "Int", "Ext", "Est.", "Actual", "Distance"
    );
    println!("{}", "-".repeat(84));
    for m in matches {
        let a = &m.assessment;
        println!(
            "{:<36} {:<8} {:>4} {:>4} {:>8} {:>9} {:>9}",
            a.id,
            a.vehicle_class.as_str(),
            a.interior_condition,
            a.exterior_condition,
            a.estimated_price,
            money(a.actual_price),
            m.distance
                .map(|d| format!("{:.4}", d))
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

pub fn output_analytics(output_format: OutputFormat, analytics: &PricingAnalytics) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(analytics);
    }

    println!("Pricing Analytics (last {} days)", analytics.window_days);
    println!("=================");
    println!("Assessments:         {}", analytics.assessment_count);
    println!("Total revenue:       {:.2}", analytics.total_revenue);
    println!("Average order value: {:.2}", analytics.average_order_value);
    if analytics.popular_services.is_empty() {
        println!("Popular services:    (none)");
    } else {
        println!(
            "Popular services:    {}",
            analytics.popular_services.join(", ")
        );
    }
    Ok(())
}
