//! Domain services
//!
//! Every service here is a pure function over data already fetched from the
//! repositories.

pub mod accuracy;
pub mod analytics;
pub mod assessment;
pub mod embedding;
pub mod estimator;
pub mod recommendation;
pub mod similarity;

pub use accuracy::{accuracy_by_class, accuracy_samples, compute_accuracy, AccuracySample};
pub use analytics::pricing_analytics;
pub use assessment::build_assessment;
pub use embedding::{feature_vector, EMBEDDING_DIMENSIONS};
pub use estimator::{estimate_price, price_breakdown, PriceBreakdown};
pub use recommendation::generate_insights;
pub use similarity::{
    find_similar, strategy_for, EmbeddingStrategy, SimilarityQuery, SimilarityStrategy,
    ThresholdStrategy,
};
