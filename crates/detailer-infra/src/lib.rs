//! Infrastructure layer - persistence implementations, loaders, export

pub mod export;
pub mod model_file;
pub mod persistence;

pub use persistence::{
    FileAssessmentRepository, FilePricingModelRepository, InMemoryAssessmentRepository,
    InMemoryPricingModelRepository,
};
