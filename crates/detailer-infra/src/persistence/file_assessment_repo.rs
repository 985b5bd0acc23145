//! File-based assessment log

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use detailer_domain::model::{apply_actual_price, apply_analysis};
use detailer_domain::repository::AssessmentRepository;
use detailer_types::{Assessment, Error, Money, Result, VehicleAnalysis};

use super::{write_json_atomic, ASSESSMENTS_FILE};

/// Append-only assessment log stored as a JSON array on disk.
///
/// Entries are only ever added; the two write-once fields are the only
/// in-place updates.
pub struct FileAssessmentRepository {
    store_path: PathBuf,
    entries: RwLock<Vec<Assessment>>,
}

impl FileAssessmentRepository {
    /// Create or load an assessment log
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let store_path = store_dir.join(ASSESSMENTS_FILE);

        let entries = if store_path.exists() {
            let file = File::open(&store_path)?;
            serde_json::from_reader(BufReader::new(file))?
        } else {
            Vec::new()
        };

        Ok(Self {
            store_path,
            entries: RwLock::new(entries),
        })
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn persist(&self, entries: &[Assessment]) -> Result<()> {
        write_json_atomic(&self.store_path, entries)?;
        debug!(path = %self.store_path.display(), count = entries.len(), "assessments persisted");
        Ok(())
    }

    /// Apply a write-once update to one entry, rolling back if the write fails
    fn update<F>(&self, id: &str, apply: F) -> Result<Assessment>
    where
        F: FnOnce(&mut Assessment) -> Result<()>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let index = entries
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        let previous = entries[index].clone();
        apply(&mut entries[index])?;

        if let Err(e) = self.persist(&entries) {
            entries[index] = previous;
            return Err(e);
        }
        Ok(entries[index].clone())
    }
}

impl AssessmentRepository for FileAssessmentRepository {
    fn append(&self, assessment: &Assessment) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|a| a.id == assessment.id) {
            return Err(Error::InvalidInput(format!(
                "assessment {} already exists",
                assessment.id
            )));
        }

        entries.push(assessment.clone());
        if let Err(e) = self.persist(&entries) {
            entries.pop();
            return Err(e);
        }
        info!(
            id = %assessment.id,
            class = %assessment.vehicle_class,
            estimated_price = assessment.estimated_price,
            "assessment appended"
        );
        Ok(())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Assessment>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.iter().find(|a| a.id == id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Assessment>> {
        let mut all = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    fn record_actual_price(
        &self,
        id: &str,
        actual_price: Money,
        at: DateTime<Utc>,
    ) -> Result<Assessment> {
        let updated = self.update(id, |a| apply_actual_price(a, actual_price, at))?;
        info!(id, actual_price, "actual price recorded");
        Ok(updated)
    }

    fn attach_analysis(
        &self,
        id: &str,
        analysis: VehicleAnalysis,
        at: DateTime<Utc>,
    ) -> Result<Assessment> {
        let updated = self.update(id, |a| apply_analysis(a, analysis, at))?;
        info!(id, "vehicle analysis attached");
        Ok(updated)
    }
}
