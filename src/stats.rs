//! Summary statistics over stored results.
//!
//! Works on the calculated values of one assay type, in storage order.

use crate::error::{AssayError, Result};
use crate::models::AssayType;
use serde::{Deserialize, Serialize};

/// Smallest sample the aggregator will summarize
pub const MIN_SAMPLE_SIZE: usize = 2;

/// Descriptive statistics for one assay type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub median: f64,
    pub mean: f64,
    /// Sample standard deviation (N - 1 denominator)
    pub std_dev: f64,
}

/// Summarize the calculated values of one assay type.
///
/// Fails with [`AssayError::InsufficientData`] when fewer than two values
/// are available, and with [`AssayError::NonFiniteValues`] when any value is
/// not finite.
pub fn summarize(assay: AssayType, values: &[f64]) -> Result<SummaryStatistics> {
    let count = values.len();
    if count < MIN_SAMPLE_SIZE {
        return Err(AssayError::InsufficientData { assay, count });
    }

    let non_finite = values.iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        return Err(AssayError::NonFiniteValues {
            assay,
            count,
            non_finite,
        });
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;

    Ok(SummaryStatistics {
        count,
        median: median(values),
        mean,
        std_dev: variance.sqrt(),
    })
}

/// Median of a non-empty slice of finite values
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_odd_sample() {
        let stats = summarize(AssayType::Tns, &[3.0, 1.0, 2.0]).unwrap();
        assert_eq!(stats.count, 3);
        assert_close(stats.median, 2.0);
        assert_close(stats.mean, 2.0);
        assert_close(stats.std_dev, 1.0);
    }

    #[test]
    fn test_even_sample_median_averages_middle_values() {
        let stats = summarize(AssayType::ZetaPotential, &[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_close(stats.median, 2.5);
        assert_close(stats.mean, 2.5);
        // Sample variance: 5 / 3
        assert_close(stats.std_dev, (5.0f64 / 3.0).sqrt());
    }

    #[test]
    fn test_two_values_use_bessel_correction() {
        let stats = summarize(AssayType::Tns, &[0.12, 0.5]).unwrap();
        assert_close(stats.mean, 0.31);
        // Population std dev would be 0.19
        assert_close(stats.std_dev, 0.19 * 2f64.sqrt());
    }

    #[test]
    fn test_matches_direct_recomputation() {
        let values: Vec<f64> = (1..=25).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();
        let stats = summarize(AssayType::Tns, &values).unwrap();

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (n - 1.0);
        let mut sorted = values.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert_close(stats.mean, mean);
        assert_close(stats.std_dev, var.sqrt());
        assert_close(stats.median, sorted[12]);
    }

    #[test]
    fn test_identical_values_have_zero_spread() {
        let stats = summarize(AssayType::Tns, &[7.5, 7.5, 7.5]).unwrap();
        assert_close(stats.std_dev, 0.0);
        assert_close(stats.median, 7.5);
    }

    #[test]
    fn test_insufficient_data() {
        for values in [&[][..], &[1.0][..]] {
            match summarize(AssayType::ZetaPotential, values) {
                Err(AssayError::InsufficientData { assay, count }) => {
                    assert_eq!(assay, AssayType::ZetaPotential);
                    assert_eq!(count, values.len());
                }
                other => panic!("Expected InsufficientData, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_non_finite_values_cannot_be_summarized() {
        let result = summarize(AssayType::Tns, &[1.0, f64::NAN, 2.0, f64::INFINITY]);
        match result {
            Err(AssayError::NonFiniteValues {
                assay,
                count,
                non_finite,
            }) => {
                assert_eq!(assay, AssayType::Tns);
                assert_eq!(count, 4);
                assert_eq!(non_finite, 2);
            }
            other => panic!("Expected NonFiniteValues, got {:?}", other),
        }
    }
}
