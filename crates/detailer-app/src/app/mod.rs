//! Use cases
//!
//! Services hold shared repository handles and are cheap to clone, so they
//! can be moved into tokio tasks.

pub mod analysis_service;
pub mod assessment_service;
pub mod insight_service;
pub mod pricing_service;

pub use analysis_service::AnalysisService;
pub use assessment_service::{AssessmentService, HistoryFilter};
pub use insight_service::{InsightService, InsightSettings};
pub use pricing_service::PricingService;
