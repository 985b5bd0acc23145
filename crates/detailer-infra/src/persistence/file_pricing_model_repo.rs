//! File-based pricing model repository

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, info};

use detailer_domain::model::next_version;
use detailer_domain::repository::PricingModelRepository;
use detailer_types::{PricingModel, Result, VersionedPricingModel};

use super::{write_json_atomic, PRICING_MODEL_FILE};

/// Stores the single versioned pricing model record as JSON.
///
/// The record is re-read on every access so that a model written by another
/// process is picked up before the version check.
pub struct FilePricingModelRepository {
    store_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePricingModelRepository {
    /// Create the store directory if needed and bind to its model file
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        Ok(Self {
            store_path: store_dir.join(PRICING_MODEL_FILE),
            write_lock: Mutex::new(()),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn read_record(&self) -> Result<Option<VersionedPricingModel>> {
        if !self.store_path.exists() {
            return Ok(None);
        }
        let file = File::open(&self.store_path)?;
        let record = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(record))
    }
}

impl PricingModelRepository for FilePricingModelRepository {
    fn current(&self) -> Result<Option<VersionedPricingModel>> {
        self.read_record()
    }

    fn compare_and_swap(
        &self,
        expected_version: Option<u64>,
        model: PricingModel,
        updated_by: &str,
    ) -> Result<VersionedPricingModel> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.read_record()?;
        let record = next_version(
            current.as_ref(),
            expected_version,
            model,
            updated_by,
            Utc::now(),
        )?;

        write_json_atomic(&self.store_path, &record)?;
        debug!(path = %self.store_path.display(), "pricing model persisted");
        info!(version = record.version, updated_by, "pricing model replaced");
        Ok(record)
    }
}
