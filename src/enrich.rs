//! Derived per-record activation scores.

use crate::data::{Dataset, Magnitude, Record};

/// Sum of a magnitude sequence, saturating at `f64::MAX` instead of overflowing to infinity.
pub fn activation_score(magnitudes: &[Magnitude]) -> f64 {
    let sum: f64 = magnitudes.iter().sum();
    if sum == f64::INFINITY { f64::MAX } else { sum }
}

/// Recompute `activation_score` for one record from its magnitudes.
pub fn enrich_record(record: &mut Record) {
    let score = activation_score(record.magnitudes());
    record.set_activation_score(score);
}

/// Populate `activation_score` on every record. Idempotent; tokens are untouched.
pub fn enrich(mut dataset: Dataset) -> Dataset {
    dataset.records.iter_mut().for_each(enrich_record);
    dataset
}
