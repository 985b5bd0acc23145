//! Analysis Service - AI vehicle analysis write-back
//!
//! 1. Load the assessment
//! 2. Skip the collaborator if an analysis is already attached
//! 3. Ask the analyzer for a structured description of the photos
//! 4. Attach the result once; the locked-in estimate is never touched

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use detailer_domain::repository::AssessmentRepository;
use detailer_types::{Assessment, Error, Result};
use detailer_vision::{AnalysisRequest, CommandAnalyzer, VehicleAnalyzer};

use crate::config::Config;

#[derive(Clone)]
pub struct AnalysisService {
    assessments: Arc<dyn AssessmentRepository>,
    analyzer: Arc<dyn VehicleAnalyzer>,
}

impl AnalysisService {
    pub fn new(
        assessments: Arc<dyn AssessmentRepository>,
        analyzer: Arc<dyn VehicleAnalyzer>,
    ) -> Self {
        Self {
            assessments,
            analyzer,
        }
    }

    /// Use the command-line analyzer from the configuration
    pub fn from_config(config: &Config, assessments: Arc<dyn AssessmentRepository>) -> Result<Self> {
        let analyzer = CommandAnalyzer::from_config(
            config.analyzer_command.as_deref(),
            config.analyzer_timeout(),
        )?;
        Ok(Self::new(assessments, Arc::new(analyzer)))
    }

    /// Run the analyzer for one assessment and store its result
    pub async fn analyze_assessment(&self, id: &str) -> Result<Assessment> {
        let assessment = self
            .assessments
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        if assessment.analysis.is_some() {
            return Err(Error::AlreadyRecorded {
                id: id.to_string(),
                field: "analysis",
            });
        }

        let request = AnalysisRequest::from_assessment(&assessment);
        let analysis = match self.analyzer.analyze(&request).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(id, analyzer = self.analyzer.name(), error = %e, "vehicle analysis failed");
                return Err(e.into());
            }
        };

        let updated = self
            .assessments
            .attach_analysis(id, analysis, Utc::now())?;
        info!(
            id,
            analyzer = self.analyzer.name(),
            confidence = updated.analysis.as_ref().map(|a| a.confidence_score),
            "vehicle analysis attached"
        );
        Ok(updated)
    }
}
