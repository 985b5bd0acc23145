//! Domain module containing pricing rules and pure services

pub mod model;
pub mod repository;
pub mod service;

pub use repository::{AssessmentRepository, PricingModelRepository};
