//! Domain model rules

pub mod assessment;
pub mod pricing_model;

pub use assessment::{apply_actual_price, apply_analysis, validate_condition};
pub use pricing_model::{next_version, validate_pricing_model};
