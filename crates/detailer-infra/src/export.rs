//! Flat CSV export of the assessment log

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use detailer_domain::service::accuracy::is_accurate;
use detailer_types::{Assessment, Error, Money, Result};

/// One CSV row per assessment
#[derive(Debug, Serialize)]
struct AssessmentRow<'a> {
    id: &'a str,
    created_at: String,
    owner_id: &'a str,
    client_name: &'a str,
    vehicle_class: &'static str,
    interior_condition: u8,
    exterior_condition: u8,
    services: String,
    estimated_price: i64,
    actual_price: Option<Money>,
    percent_error: Option<f64>,
    accurate: bool,
    analysis_confidence: Option<f64>,
}

impl<'a> AssessmentRow<'a> {
    fn from_assessment(a: &'a Assessment) -> Self {
        let percent_error = a
            .actual_price
            .filter(|actual| *actual > 0.0)
            .map(|actual| (a.estimated_price as f64 - actual) / actual * 100.0);

        Self {
            id: &a.id,
            created_at: a.created_at.to_rfc3339(),
            owner_id: &a.owner_id,
            client_name: &a.client_name,
            vehicle_class: a.vehicle_class.as_str(),
            interior_condition: a.interior_condition,
            exterior_condition: a.exterior_condition,
            services: a.services.join(";"),
            estimated_price: a.estimated_price,
            actual_price: a.actual_price,
            percent_error,
            accurate: is_accurate(a),
            analysis_confidence: a.analysis.as_ref().map(|v| v.confidence_score),
        }
    }
}

fn csv_error(e: csv::Error) -> Error {
    Error::Csv(e.to_string())
}

/// Write assessments as CSV with a header row. Returns the number of rows.
pub fn write_assessments_csv<W: Write>(writer: W, assessments: &[Assessment]) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for assessment in assessments {
        csv_writer
            .serialize(AssessmentRow::from_assessment(assessment))
            .map_err(csv_error)?;
    }
    csv_writer.flush()?;
    Ok(assessments.len())
}

/// Export assessments to a CSV file
pub fn export_assessments_csv(path: &Path, assessments: &[Assessment]) -> Result<usize> {
    let file = File::create(path)?;
    let count = write_assessments_csv(file, assessments)?;
    tracing::info!(path = %path.display(), count, "assessments exported");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use detailer_types::VehicleClass;

    fn sample(id: &str, estimated: i64, actual: Option<Money>) -> Assessment {
        Assessment {
            id: id.to_string(),
            owner_id: "owner".to_string(),
            client_name: "Lee, Sam".to_string(),
            images: vec!["a.jpg".to_string()],
            vehicle_class: VehicleClass::Van,
            interior_condition: 40,
            exterior_condition: 70,
            description: String::new(),
            services: vec!["waxing".to_string(), "interiorCleaning".to_string()],
            estimated_price: estimated,
            actual_price: actual,
            actual_recorded_at: None,
            embedding: None,
            analysis: None,
            analyzed_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let rows = vec![sample("a1", 110, Some(100.0)), sample("a2", 90, None)];
        let mut buf = Vec::new();
        let count = write_assessments_csv(&mut buf, &rows).unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id,created_at,owner_id,client_name,vehicle_class"));
        assert!(lines[1].contains("\"Lee, Sam\""));
        assert!(lines[1].contains("waxing;interiorCleaning"));
        assert!(lines[1].ends_with(",110,100.0,10.0,true,"));
        assert!(lines[2].ends_with(",90,,,false,"));
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let count = export_assessments_csv(&path, &[sample("a1", 100, None)]).unwrap();
        assert_eq!(count, 1);
        assert!(std::fs::read_to_string(&path).unwrap().contains("a1"));
    }
}
