//! Per-record intensity normalization.

use crate::types::{Intensity, Magnitude};

/// Largest finite magnitude, floored at 0. Empty input yields 0.
pub fn local_max(magnitudes: &[Magnitude]) -> Magnitude {
    magnitudes
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0, f64::max)
}

/// Scale magnitudes into `[0, 1]` relative to their own maximum.
///
/// When the maximum is 0 (empty or all-zero input) every intensity is 0.
pub fn normalize_intensities(magnitudes: &[Magnitude]) -> Vec<Intensity> {
    let max = local_max(magnitudes);
    if max <= 0.0 {
        return vec![0.0; magnitudes.len()];
    }
    magnitudes
        .iter()
        .map(|value| {
            if value.is_finite() {
                (value / max).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_against_local_max() {
        assert_eq!(normalize_intensities(&[0.0, 0.0, 10.0]), vec![0.0, 0.0, 1.0]);
        assert_eq!(normalize_intensities(&[1.0, 2.0, 4.0]), vec![0.25, 0.5, 1.0]);
    }

    #[test]
    fn zero_and_empty_inputs_yield_zeros() {
        assert_eq!(normalize_intensities(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert!(normalize_intensities(&[]).is_empty());
        assert_eq!(local_max(&[]), 0.0);
    }

    #[test]
    fn output_stays_in_unit_range() {
        let input = [-3.0, 0.5, f64::NAN, 2.0, f64::INFINITY];
        let output = normalize_intensities(&input);
        assert_eq!(output.len(), input.len());
        assert!(output.iter().all(|value| (0.0..=1.0).contains(value)));
        assert_eq!(output[3], 1.0);
    }

    #[test]
    fn records_normalize_independently() {
        let small = normalize_intensities(&[0.1, 0.2]);
        let large = normalize_intensities(&[100.0, 200.0]);
        assert_eq!(small, large);
    }
}
