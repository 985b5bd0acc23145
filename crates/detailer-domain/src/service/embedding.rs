//! Fixed-length feature vectors for similarity search
//!
//! Layout: one-hot vehicle class (6 dims, in `VehicleClass::ALL` order)
//! followed by interior and exterior condition scaled to [0, 1].

use detailer_types::{Assessment, VehicleClass};

pub const EMBEDDING_DIMENSIONS: usize = VehicleClass::ALL.len() + 2;

/// Feature vector for a class and a pair of condition scores
pub fn feature_vector(class: VehicleClass, interior: u8, exterior: u8) -> Vec<f32> {
    let mut vector = vec![0.0; EMBEDDING_DIMENSIONS];
    vector[class.index()] = 1.0;
    vector[VehicleClass::ALL.len()] = f32::from(interior) / 100.0;
    vector[VehicleClass::ALL.len() + 1] = f32::from(exterior) / 100.0;
    vector
}

/// The stored embedding when it has the expected shape, otherwise one derived
/// from the record's own features
pub fn assessment_vector(assessment: &Assessment) -> Vec<f32> {
    match &assessment.embedding {
        Some(stored) if stored.len() == EMBEDDING_DIMENSIONS => stored.clone(),
        _ => feature_vector(
            assessment.vehicle_class,
            assessment.interior_condition,
            assessment.exterior_condition,
        ),
    }
}

/// Euclidean distance, `None` for mismatched or empty vectors
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum();
    Some(sum.sqrt())
}
