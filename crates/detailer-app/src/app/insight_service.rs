//! Insight Service - read-only reports over the assessment history

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use detailer_domain::repository::{AssessmentRepository, PricingModelRepository};
use detailer_domain::service::accuracy::AccuracySample;
use detailer_domain::service::{
    accuracy_by_class, accuracy_samples, compute_accuracy, find_similar, generate_insights,
    pricing_analytics, strategy_for, SimilarityQuery,
};
use detailer_types::{
    AccuracySnapshot, Error, PredictiveInsights, PricingAnalytics, Result, SimilarAssessment,
    SimilarityMethod, VehicleClass,
};

use crate::config::Config;

/// Defaults for calls that leave a knob unset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightSettings {
    pub similarity_method: SimilarityMethod,
    pub similar_limit: usize,
    pub analytics_window_days: u32,
}

impl Default for InsightSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl InsightSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            similarity_method: config.similarity_strategy,
            similar_limit: config.similar_limit,
            analytics_window_days: config.analytics_window_days,
        }
    }
}

#[derive(Clone)]
pub struct InsightService {
    models: Arc<dyn PricingModelRepository>,
    assessments: Arc<dyn AssessmentRepository>,
    settings: InsightSettings,
}

impl InsightService {
    pub fn new(
        models: Arc<dyn PricingModelRepository>,
        assessments: Arc<dyn AssessmentRepository>,
        settings: InsightSettings,
    ) -> Self {
        Self {
            models,
            assessments,
            settings,
        }
    }

    pub fn settings(&self) -> InsightSettings {
        self.settings
    }

    /// Price adjustment suggestions based on an owner's latest assessment
    pub fn insights_for_owner(&self, owner_id: &str) -> Result<PredictiveInsights> {
        let history = self.assessments.find_by_owner(owner_id)?;
        let model = self.models.current()?.map(|record| record.model);
        generate_insights(model.as_ref(), &history)
    }

    pub fn accuracy(&self) -> Result<AccuracySnapshot> {
        Ok(compute_accuracy(&self.assessments.find_all()?))
    }

    pub fn accuracy_by_class(&self) -> Result<BTreeMap<VehicleClass, AccuracySnapshot>> {
        Ok(accuracy_by_class(&self.assessments.find_all()?))
    }

    /// Per-assessment errors for every job with a realized price, newest first
    pub fn accuracy_samples(&self) -> Result<Vec<AccuracySample>> {
        Ok(accuracy_samples(&self.assessments.find_all()?))
    }

    /// Past assessments resembling `query`
    pub fn similar(
        &self,
        query: &SimilarityQuery,
        k: Option<usize>,
        method: Option<SimilarityMethod>,
    ) -> Result<Vec<SimilarAssessment>> {
        let strategy = strategy_for(method.unwrap_or(self.settings.similarity_method));
        let corpus = self.assessments.find_all()?;
        find_similar(
            strategy.as_ref(),
            query,
            k.unwrap_or(self.settings.similar_limit),
            &corpus,
        )
    }

    /// Past assessments resembling a stored one, excluding itself
    pub fn similar_to(
        &self,
        id: &str,
        k: Option<usize>,
        method: Option<SimilarityMethod>,
    ) -> Result<Vec<SimilarAssessment>> {
        let target = self
            .assessments
            .find_by_id(id)?
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let query = SimilarityQuery::new(
            target.vehicle_class,
            i32::from(target.interior_condition),
            i32::from(target.exterior_condition),
        )?;

        let strategy = strategy_for(method.unwrap_or(self.settings.similarity_method));
        let corpus: Vec<_> = self
            .assessments
            .find_all()?
            .into_iter()
            .filter(|a| a.id != target.id)
            .collect();
        find_similar(
            strategy.as_ref(),
            &query,
            k.unwrap_or(self.settings.similar_limit),
            &corpus,
        )
    }

    /// Revenue analytics for the trailing window ending now
    pub fn analytics(&self, window_days: Option<u32>) -> Result<PricingAnalytics> {
        self.analytics_at(Utc::now(), window_days)
    }

    pub fn analytics_at(
        &self,
        now: DateTime<Utc>,
        window_days: Option<u32>,
    ) -> Result<PricingAnalytics> {
        let assessments = self.assessments.find_all()?;
        Ok(pricing_analytics(
            &assessments,
            now,
            window_days.unwrap_or(self.settings.analytics_window_days),
        ))
    }
}
