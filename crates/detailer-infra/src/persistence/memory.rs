//! In-memory repositories
//!
//! Same contracts as the file-backed stores without touching disk.

use std::sync::{Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};

use detailer_domain::model::{apply_actual_price, apply_analysis, next_version};
use detailer_domain::repository::{AssessmentRepository, PricingModelRepository};
use detailer_types::{
    Assessment, Error, Money, PricingModel, Result, VehicleAnalysis, VersionedPricingModel,
};

#[derive(Default)]
pub struct InMemoryPricingModelRepository {
    record: Mutex<Option<VersionedPricingModel>>,
}

impl InMemoryPricingModelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PricingModelRepository for InMemoryPricingModelRepository {
    fn current(&self) -> Result<Option<VersionedPricingModel>> {
        Ok(self
            .record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn compare_and_swap(
        &self,
        expected_version: Option<u64>,
        model: PricingModel,
        updated_by: &str,
    ) -> Result<VersionedPricingModel> {
        let mut record = self.record.lock().unwrap_or_else(PoisonError::into_inner);
        let next = next_version(
            record.as_ref(),
            expected_version,
            model,
            updated_by,
            Utc::now(),
        )?;
        *record = Some(next.clone());
        Ok(next)
    }
}

#[derive(Default)]
pub struct InMemoryAssessmentRepository {
    entries: RwLock<Vec<Assessment>>,
}

impl InMemoryAssessmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the log with existing assessments
    pub fn with_entries(entries: Vec<Assessment>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    fn update<F>(&self, id: &str, apply: F) -> Result<Assessment>
    where
        F: FnOnce(&mut Assessment) -> Result<()>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        apply(entry)?;
        Ok(entry.clone())
    }
}

impl AssessmentRepository for InMemoryAssessmentRepository {
    fn append(&self, assessment: &Assessment) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|a| a.id == assessment.id) {
            return Err(Error::InvalidInput(format!(
                "assessment {} already exists",
                assessment.id
            )));
        }
        entries.push(assessment.clone());
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
        self.update(id, |a| apply_actual_price(a, actual_price, at))
    }

    fn attach_analysis(
        &self,
        id: &str,
        analysis: VehicleAnalysis,
        at: DateTime<Utc>,
    ) -> Result<Assessment> {
        self.update(id, |a| apply_analysis(a, analysis, at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_cas() {
        let repo = InMemoryPricingModelRepository::new();
        assert!(repo.current().unwrap().is_none());

        let v1 = repo
            .compare_and_swap(None, PricingModel::default(), "root")
            .unwrap();
        assert_eq!(v1.version, 1);
        assert!(matches!(
            repo.compare_and_swap(Some(7), PricingModel::default(), "root"),
            Err(Error::Conflict {
                expected: Some(7),
                actual: Some(1)
            })
        ));
    }

    #[test]
    fn test_in_memory_unknown_id() {
        let repo = InMemoryAssessmentRepository::new();
        assert!(matches!(
            repo.record_actual_price("missing", 10.0, Utc::now()),
            Err(Error::NotFound(_))
        ));
    }
}
