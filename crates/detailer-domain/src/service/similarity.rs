//! Retrieval of comparable past assessments
//!
//! Two strategies answer different questions and are kept separate:
//! [`ThresholdStrategy`] finds peers of the same class with close condition
//! scores, [`EmbeddingStrategy`] finds the generally nearest jobs in feature
//! space across every class.

use std::cmp::Ordering;

use detailer_types::{
    Assessment, Error, Result, SimilarAssessment, SimilarityMethod, VehicleClass,
};

use crate::model::validate_condition;
use crate::service::embedding::{assessment_vector, euclidean_distance, feature_vector};

/// Maximum per-side condition difference for a threshold match
pub const CONDITION_TOLERANCE: u8 = 10;

/// Default number of matches returned to callers
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// Features of the assessment being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityQuery {
    pub vehicle_class: VehicleClass,
    pub interior_condition: u8,
    pub exterior_condition: u8,
}

impl SimilarityQuery {
    pub fn new(vehicle_class: VehicleClass, interior: i32, exterior: i32) -> Result<Self> {
        Ok(Self {
            vehicle_class,
            interior_condition: validate_condition("interiorCondition", interior)?,
            exterior_condition: validate_condition("exteriorCondition", exterior)?,
        })
    }
}

/// A ranking of the corpus against a query, most similar first
pub trait SimilarityStrategy: Send + Sync {
    fn method(&self) -> SimilarityMethod;

    /// Every matching assessment in rank order
    fn rank(&self, query: &SimilarityQuery, corpus: &[Assessment]) -> Vec<SimilarAssessment>;
}

/// Same class and both conditions within `tolerance`, most recent first
#[derive(Debug, Clone, Copy)]
pub struct ThresholdStrategy {
    pub tolerance: u8,
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self {
            tolerance: CONDITION_TOLERANCE,
        }
    }
}

impl SimilarityStrategy for ThresholdStrategy {
    fn method(&self) -> SimilarityMethod {
        SimilarityMethod::Threshold
    }

    fn rank(&self, query: &SimilarityQuery, corpus: &[Assessment]) -> Vec<SimilarAssessment> {
        let mut matches: Vec<&Assessment> = corpus
            .iter()
            .filter(|a| a.vehicle_class == query.vehicle_class)
            .filter(|a| {
                a.interior_condition.abs_diff(query.interior_condition) <= self.tolerance
                    && a.exterior_condition.abs_diff(query.exterior_condition) <= self.tolerance
            })
            .collect();

        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        matches
            .into_iter()
            .map(|a| SimilarAssessment {
                assessment: a.clone(),
                distance: None,
            })
            .collect()
    }
}

/// Nearest feature vectors by Euclidean distance, ties broken most recent first
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingStrategy;

impl SimilarityStrategy for EmbeddingStrategy {
    fn method(&self) -> SimilarityMethod {
        SimilarityMethod::Embedding
    }

    fn rank(&self, query: &SimilarityQuery, corpus: &[Assessment]) -> Vec<SimilarAssessment> {
        let target = feature_vector(
            query.vehicle_class,
            query.interior_condition,
            query.exterior_condition,
        );

        let mut scored: Vec<(f64, &Assessment)> = corpus
            .iter()
            .filter_map(|a| euclidean_distance(&target, &assessment_vector(a)).map(|d| (d, a)))
            .collect();

        scored.sort_by(|(da, a), (db, b)| {
            da.partial_cmp(db)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        scored
            .into_iter()
            .map(|(distance, a)| SimilarAssessment {
                assessment: a.clone(),
                distance: Some(distance),
            })
            .collect()
    }
}

/// Strategy implementing a configured method
pub fn strategy_for(method: SimilarityMethod) -> Box<dyn SimilarityStrategy> {
    match method {
        SimilarityMethod::Threshold => Box::new(ThresholdStrategy::default()),
        SimilarityMethod::Embedding => Box::new(EmbeddingStrategy),
    }
}

/// Up to `k` assessments from `corpus` most similar to `query`
pub fn find_similar(
    strategy: &dyn SimilarityStrategy,
    query: &SimilarityQuery,
    k: usize,
    corpus: &[Assessment],
) -> Result<Vec<SimilarAssessment>> {
    if k == 0 {
        return Err(Error::InvalidInput(
            "number of similar assessments must be positive".to_string(),
        ));
    }
    let mut ranked = strategy.rank(query, corpus);
    ranked.truncate(k);
    Ok(ranked)
}
