//! Vision module - external analysis of vehicle photos
//!
//! The analyzer is an injected collaborator. Its result is informational and
//! never feeds back into a locked-in estimate.

mod analyzer;
mod command;
mod response;

pub use analyzer::{AnalysisError, AnalysisRequest, VehicleAnalyzer};
pub use command::{CommandAnalyzer, DEFAULT_ANALYZER_TIMEOUT};
pub use response::{extract_json_from_response, parse_analysis};
