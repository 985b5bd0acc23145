//! Repository trait definitions for data persistence

use chrono::{DateTime, Utc};
use detailer_types::{
    Assessment, Money, PricingModel, Result, VehicleAnalysis, VehicleClass,
    VersionedPricingModel,
};

/// Storage for the single current pricing model
pub trait PricingModelRepository: Send + Sync {
    /// Load the current record, if one was ever written
    fn current(&self) -> Result<Option<VersionedPricingModel>>;

    /// Overwrite the current model if its version still equals `expected_version`.
    ///
    /// `None` means the caller saw no model at all. On mismatch the
    /// implementation fails with `Error::Conflict` and leaves the record
    /// untouched. The check and the write must be atomic.
    fn compare_and_swap(
        &self,
        expected_version: Option<u64>,
        model: PricingModel,
        updated_by: &str,
    ) -> Result<VersionedPricingModel>;
}

/// Append-only log of assessments
pub trait AssessmentRepository: Send + Sync {
    /// Append a new assessment
    fn append(&self, assessment: &Assessment) -> Result<()>;

    /// Find an assessment by id
    fn find_by_id(&self, id: &str) -> Result<Option<Assessment>>;

    /// All assessments, newest first
    fn find_all(&self) -> Result<Vec<Assessment>>;

    /// Set the realized price once
    fn record_actual_price(
        &self,
        id: &str,
        actual_price: Money,
        at: DateTime<Utc>,
    ) -> Result<Assessment>;

    /// Attach the external analysis once
    fn attach_analysis(
        &self,
        id: &str,
        analysis: VehicleAnalysis,
        at: DateTime<Utc>,
    ) -> Result<Assessment>;

    /// Assessments of one owner, newest first
    fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Assessment>> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|a| a.owner_id == owner_id)
            .collect())
    }

    /// Assessments of one vehicle class, newest first
    fn find_by_class(&self, class: VehicleClass) -> Result<Vec<Assessment>> {
        Ok(self
            .find_all()?
            .into_iter()
            .filter(|a| a.vehicle_class == class)
            .collect())
    }
}
