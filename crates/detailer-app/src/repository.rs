//! Repository adapters for persistence layer

use std::path::PathBuf;
use std::sync::Arc;

use detailer_domain::repository::{AssessmentRepository, PricingModelRepository};
use detailer_infra::persistence::{
    FileAssessmentRepository, FilePricingModelRepository, InMemoryAssessmentRepository,
    InMemoryPricingModelRepository,
};
use detailer_types::Result;

use crate::config::Config;

/// The repositories every use case works against
#[derive(Clone)]
pub struct Repositories {
    pub pricing: Arc<dyn PricingModelRepository>,
    pub assessments: Arc<dyn AssessmentRepository>,
}

impl Repositories {
    /// File-backed repositories in the configured store directory
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(config.store_dir()?)
    }

    /// File-backed repositories at a custom directory
    pub fn open_at(store_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            pricing: Arc::new(FilePricingModelRepository::open(store_dir.clone())?),
            assessments: Arc::new(FileAssessmentRepository::open(store_dir)?),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            pricing: Arc::new(InMemoryPricingModelRepository::new()),
            assessments: Arc::new(InMemoryAssessmentRepository::new()),
        }
    }
}
