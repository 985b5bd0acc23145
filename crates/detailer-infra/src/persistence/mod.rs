//! Persistence implementations
//!
//! File-based implementations of the domain repository traits, plus
//! in-memory ones for embedding and tests.

mod file_assessment_repo;
mod file_pricing_model_repo;
mod memory;

pub use file_assessment_repo::FileAssessmentRepository;
pub use file_pricing_model_repo::FilePricingModelRepository;
pub use memory::{InMemoryAssessmentRepository, InMemoryPricingModelRepository};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use detailer_types::Result;

pub const PRICING_MODEL_FILE: &str = "pricing_model.json";
pub const ASSESSMENTS_FILE: &str = "assessments.json";

/// Write `value` as pretty JSON next to `path`, then move it into place so a
/// crash never leaves a half-written store file.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    {
        let file = File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}
