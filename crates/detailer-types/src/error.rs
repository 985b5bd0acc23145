//! Error types for detailer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration not found")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

/// A single field that failed pricing model validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted path of the offending field, e.g. `basePrice.luxury`
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

fn version_label(version: &Option<u64>) -> String {
    match version {
        Some(v) => format!("v{}", v),
        None => "none".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Pricing model not found (system not configured yet)")]
    ModelNotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Pricing model validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error(
        "Pricing model was modified concurrently (expected {}, found {}); reload and retry",
        version_label(.expected),
        version_label(.actual)
    )]
    Conflict {
        expected: Option<u64>,
        actual: Option<u64>,
    },

    #[error("Assessment not found: {0}")]
    NotFound(String),

    #[error("{field} already recorded for assessment {id}")]
    AlreadyRecorded { id: String, field: &'static str },

    #[error("Vehicle analysis unavailable: {0}")]
    AnalysisUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("CSV export error: {0}")]
    Csv(String),
}

impl Error {
    /// Only optimistic-concurrency failures are worth retrying, after a fresh read.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }

    /// Violations carried by a validation failure (empty for other kinds)
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            Error::Validation(v) => v,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_conflict_is_retryable() {
        let conflict = Error::Conflict {
            expected: Some(1),
            actual: Some(2),
        };
        assert!(conflict.is_retryable());
        assert!(!Error::ModelNotFound.is_retryable());
        assert!(!Error::InvalidInput("x".into()).is_retryable());
    }

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = Error::Validation(vec![
            FieldViolation::new("basePrice.van", "missing"),
            FieldViolation::new("surcharges.luxurySurcharge", "must be non-negative"),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("basePrice.van: missing"));
        assert!(msg.contains("surcharges.luxurySurcharge"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_conflict_message_without_version() {
        let err = Error::Conflict {
            expected: None,
            actual: Some(3),
        };
        assert!(err.to_string().contains("expected none, found v3"));
    }
}
