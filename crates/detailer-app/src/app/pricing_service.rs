//! Pricing Service - quotes and pricing model administration

use std::sync::Arc;

use tracing::{debug, info, warn};

use detailer_domain::model::{validate_condition, validate_pricing_model};
use detailer_domain::repository::PricingModelRepository;
use detailer_domain::service::{estimate_price, price_breakdown, PriceBreakdown};
use detailer_types::{Caller, Error, PricingModel, Result, VehicleClass, VersionedPricingModel};

#[derive(Clone)]
pub struct PricingService {
    models: Arc<dyn PricingModelRepository>,
}

impl PricingService {
    pub fn new(models: Arc<dyn PricingModelRepository>) -> Self {
        Self { models }
    }

    /// The model in force, with its version
    pub fn current(&self) -> Result<VersionedPricingModel> {
        self.models.current()?.ok_or(Error::ModelNotFound)
    }

    pub fn current_model(&self) -> Result<PricingModel> {
        Ok(self.current()?.model)
    }

    /// Quote a job with the model in force
    pub fn estimate<S: AsRef<str>>(
        &self,
        vehicle_class: VehicleClass,
        interior_condition: i32,
        exterior_condition: i32,
        services: &[S],
    ) -> Result<i64> {
        validate_condition("interiorCondition", interior_condition)?;
        validate_condition("exteriorCondition", exterior_condition)?;
        let model = self.current_model()?;
        estimate_price(
            vehicle_class,
            interior_condition,
            exterior_condition,
            services,
            &model,
        )
    }

    /// Same as [`estimate`](Self::estimate) with every intermediate value
    pub fn breakdown<S: AsRef<str>>(
        &self,
        vehicle_class: VehicleClass,
        interior_condition: i32,
        exterior_condition: i32,
        services: &[S],
    ) -> Result<PriceBreakdown> {
        validate_condition("interiorCondition", interior_condition)?;
        validate_condition("exteriorCondition", exterior_condition)?;
        let model = self.current_model()?;
        price_breakdown(
            vehicle_class,
            interior_condition,
            exterior_condition,
            services,
            &model,
        )
    }

    /// Replace the whole pricing model.
    ///
    /// `expected_version` is the version the caller based its edit on; a
    /// concurrent replacement makes this fail with `Error::Conflict`.
    pub fn replace(
        &self,
        caller: &Caller,
        model: PricingModel,
        expected_version: Option<u64>,
    ) -> Result<VersionedPricingModel> {
        if !caller.is_admin() {
            warn!(subject = %caller.subject, role = %caller.role, "pricing model change refused");
            return Err(Error::Unauthorized);
        }
        validate_pricing_model(&model)?;

        match self
            .models
            .compare_and_swap(expected_version, model, &caller.subject)
        {
            Ok(record) => Ok(record),
            Err(e @ Error::Conflict { .. }) => {
                warn!(subject = %caller.subject, error = %e, "pricing model replace lost a race");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Write the default model unless one already exists
    pub fn initialize(&self, caller: &Caller) -> Result<VersionedPricingModel> {
        if !caller.is_admin() {
            return Err(Error::Unauthorized);
        }
        if let Some(existing) = self.models.current()? {
            debug!(version = existing.version, "pricing model already initialized");
            return Ok(existing);
        }

        match self
            .models
            .compare_and_swap(None, PricingModel::default(), &caller.subject)
        {
            Ok(record) => {
                info!(subject = %caller.subject, "default pricing model created");
                Ok(record)
            }
            // Someone else initialized it first
            Err(Error::Conflict { .. }) => self.current(),
            Err(e) => Err(e),
        }
    }
}
