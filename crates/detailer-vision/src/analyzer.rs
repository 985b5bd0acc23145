//! Analyzer trait and its request/error types

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use detailer_types::{Assessment, VehicleAnalysis, VehicleClass};

/// What the analyzer is told about the job
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub assessment_id: String,
    pub vehicle_class: VehicleClass,
    pub images: Vec<String>,
    pub description: String,
    pub interior_condition: u8,
    pub exterior_condition: u8,
}

impl AnalysisRequest {
    pub fn from_assessment(assessment: &Assessment) -> Self {
        Self {
            assessment_id: assessment.id.clone(),
            vehicle_class: assessment.vehicle_class,
            images: assessment.images.clone(),
            description: assessment.description.clone(),
            interior_condition: assessment.interior_condition,
            exterior_condition: assessment.exterior_condition,
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no analyzer command configured")]
    NotConfigured,

    #[error("invalid analyzer command: {0}")]
    InvalidCommand(String),

    #[error("failed to run analyzer: {0}")]
    Io(#[from] std::io::Error),

    #[error("analyzer timed out after {0:?}")]
    Timeout(Duration),

    #[error("analyzer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("analyzer returned no output")]
    EmptyOutput,

    #[error("could not parse analyzer output: {0}")]
    Parse(String),
}

impl From<AnalysisError> for detailer_types::Error {
    fn from(e: AnalysisError) -> Self {
        detailer_types::Error::AnalysisUnavailable(e.to_string())
    }
}

/// Produces a structured description of a vehicle from its photos
#[async_trait]
pub trait VehicleAnalyzer: Send + Sync {
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> std::result::Result<VehicleAnalysis, AnalysisError>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "analyzer"
    }
}
