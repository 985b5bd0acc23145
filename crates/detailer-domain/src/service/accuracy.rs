//! Estimate-vs-actual accuracy analysis

use std::collections::BTreeMap;

use detailer_types::{AccuracySnapshot, Assessment, Money, VehicleClass};
use serde::Serialize;

/// An estimate counts as accurate when within 10% of the actual price
pub const ACCURACY_TOLERANCE: f64 = 0.10;

/// Single assessment with a recorded actual price
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccuracySample {
    pub assessment_id: String,
    pub vehicle_class: VehicleClass,
    pub estimated: i64,
    pub actual: Money,
}

impl AccuracySample {
    pub fn error(&self) -> f64 {
        self.estimated as f64 - self.actual
    }

    pub fn abs_error(&self) -> f64 {
        self.error().abs()
    }

    pub fn percent_error(&self) -> f64 {
        if self.actual > 0.0 {
            (self.error() / self.actual) * 100.0
        } else {
            0.0
        }
    }

    pub fn is_accurate(&self) -> bool {
        self.actual > 0.0 && self.abs_error() / self.actual <= ACCURACY_TOLERANCE
    }
}

/// Whether the locked-in estimate landed within tolerance of the actual price.
/// Assessments without an actual price, or with a zero one, never count.
pub fn is_accurate(assessment: &Assessment) -> bool {
    sample_of(assessment)
        .map(|s| s.is_accurate())
        .unwrap_or(false)
}

fn sample_of(assessment: &Assessment) -> Option<AccuracySample> {
    assessment.actual_price.map(|actual| AccuracySample {
        assessment_id: assessment.id.clone(),
        vehicle_class: assessment.vehicle_class,
        estimated: assessment.estimated_price,
        actual,
    })
}

/// Accuracy over every supplied assessment
pub fn compute_accuracy(assessments: &[Assessment]) -> AccuracySnapshot {
    let total_assessments = assessments.len();
    let accurate_assessments = assessments.iter().filter(|a| is_accurate(a)).count();

    let accuracy = if total_assessments == 0 {
        0.0
    } else {
        accurate_assessments as f64 / total_assessments as f64 * 100.0
    };

    AccuracySnapshot {
        accuracy,
        total_assessments,
        accurate_assessments,
    }
}

/// Accuracy grouped by vehicle class
pub fn accuracy_by_class(assessments: &[Assessment]) -> BTreeMap<VehicleClass, AccuracySnapshot> {
    let mut groups: BTreeMap<VehicleClass, Vec<Assessment>> = BTreeMap::new();
    for assessment in assessments {
        groups
            .entry(assessment.vehicle_class)
            .or_default()
            .push(assessment.clone());
    }
    groups
        .into_iter()
        .map(|(class, group)| (class, compute_accuracy(&group)))
        .collect()
}

/// Per-assessment error details for assessments with an actual price
pub fn accuracy_samples(assessments: &[Assessment]) -> Vec<AccuracySample> {
    assessments.iter().filter_map(sample_of).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::assessment::fixtures::assessment;

    fn priced(id: &str, class: VehicleClass, estimated: i64, actual: Option<f64>) -> Assessment {
        let mut a = assessment(id, class, 50, 50, 0);
        a.estimated_price = estimated;
        a.actual_price = actual;
        a
    }

    #[test]
    fn test_empty_corpus() {
        let snapshot = compute_accuracy(&[]);
        assert_eq!(snapshot, AccuracySnapshot::default());
        assert_eq!(snapshot.accuracy, 0.0);
        assert_eq!(snapshot.total_assessments, 0);
        assert_eq!(snapshot.accurate_assessments, 0);
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        // |110 - 100| / 100 = 0.10
        assert!(is_accurate(&priced("a", VehicleClass::Sedan, 110, Some(100.0))));
        assert!(is_accurate(&priced("b", VehicleClass::Sedan, 90, Some(100.0))));
        assert!(!is_accurate(&priced("c", VehicleClass::Sedan, 111, Some(100.0))));
    }

    #[test]
    fn test_missing_or_zero_actual_is_not_accurate() {
        assert!(!is_accurate(&priced("a", VehicleClass::Sedan, 100, None)));
        assert!(!is_accurate(&priced("b", VehicleClass::Sedan, 0, Some(0.0))));
    }

    #[test]
    fn test_accuracy_counts_every_assessment() {
        let corpus = vec![
            priced("a", VehicleClass::Sedan, 100, Some(100.0)),
            priced("b", VehicleClass::Sedan, 100, Some(150.0)),
            priced("c", VehicleClass::Suv, 100, Some(95.0)),
            priced("d", VehicleClass::Suv, 100, None),
        ];
        let snapshot = compute_accuracy(&corpus);
        assert_eq!(snapshot.total_assessments, 4);
        assert_eq!(snapshot.accurate_assessments, 2);
        assert!((snapshot.accuracy - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_by_class() {
        let corpus = vec![
            priced("a", VehicleClass::Sedan, 100, Some(100.0)),
            priced("b", VehicleClass::Sedan, 100, Some(150.0)),
            priced("c", VehicleClass::Van, 100, Some(105.0)),
        ];
        let grouped = accuracy_by_class(&corpus);
        assert_eq!(grouped.len(), 2);
        assert!((grouped[&VehicleClass::Sedan].accuracy - 50.0).abs() < 1e-9);
        assert!((grouped[&VehicleClass::Van].accuracy - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sample_errors() {
        let corpus = vec![
            priced("a", VehicleClass::Sedan, 120, Some(100.0)),
            priced("b", VehicleClass::Sedan, 80, None),
        ];
        let samples = accuracy_samples(&corpus);
        assert_eq!(samples.len(), 1);
        assert!((samples[0].error() - 20.0).abs() < 1e-9);
        assert!((samples[0].percent_error() - 20.0).abs() < 1e-9);
        assert!(!samples[0].is_accurate());
    }
}
