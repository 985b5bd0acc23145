//! Revenue analytics over a trailing window

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use detailer_types::{Assessment, Money, PricingAnalytics};

pub const DEFAULT_ANALYTICS_WINDOW_DAYS: u32 = 30;

const POPULAR_SERVICE_COUNT: usize = 3;

/// Revenue, average order value and the most used services among
/// assessments created within `window_days` before `now`. A window reaching
/// past the earliest representable instant covers the whole history.
pub fn pricing_analytics(
    assessments: &[Assessment],
    now: DateTime<Utc>,
    window_days: u32,
) -> PricingAnalytics {
    let since = now
        .checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let recent: Vec<&Assessment> = assessments
        .iter()
        .filter(|a| a.created_at >= since)
        .collect();

    let total_revenue: Money = recent.iter().map(|a| a.estimated_price as Money).sum();
    let average_order_value = if recent.is_empty() {
        0.0
    } else {
        total_revenue / recent.len() as f64
    };

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for assessment in &recent {
        let keys: HashSet<&str> = assessment.services.iter().map(String::as_str).collect();
        for key in keys {
            *counts.entry(key).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(ka, ca), (kb, cb)| cb.cmp(ca).then_with(|| ka.cmp(kb)));

    PricingAnalytics {
        total_revenue,
        average_order_value,
        popular_services: ranked
            .into_iter()
            .take(POPULAR_SERVICE_COUNT)
            .map(|(k, _)| k.to_string())
            .collect(),
        assessment_count: recent.len(),
        window_days,
    }
}
