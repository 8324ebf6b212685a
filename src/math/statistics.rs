//! Descriptive statistics of a numeric sequence.
//!
//! Variance is the population variance (divide by `n`), so a single value has a
//! variance of zero rather than being undefined.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Summary of a column of values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub mean: f64,
    pub median: f64,
    pub variance: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Statistics {
    /// Compute statistics over `values`.
    ///
    /// Fails with [`Error::EmptyData`] when `values` is empty.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::EmptyData("statistics"));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            mean,
            median: median(values)?,
            variance,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }

    /// Like [`Statistics::from_values`] but maps "no values" to `None`.
    pub fn maybe_from_values(values: &[f64]) -> Option<Self> {
        Self::from_values(values).ok()
    }
}

/// Median of `values`; the mean of the two middle values for even lengths.
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptyData("median"));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn statistics_of_small_sequence() {
        let stats = Statistics::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(stats.mean, 5.0);
        assert_relative_eq!(stats.median, 4.5);
        assert_relative_eq!(stats.variance, 4.0);
        assert_relative_eq!(stats.std_dev, 2.0);
        assert_relative_eq!(stats.min, 2.0);
        assert_relative_eq!(stats.max, 9.0);
    }

    #[test]
    fn single_value_has_zero_spread() {
        let stats = Statistics::from_values(&[3.5]).unwrap();
        assert_relative_eq!(stats.mean, 3.5);
        assert_relative_eq!(stats.median, 3.5);
        assert_relative_eq!(stats.variance, 0.0);
    }

    #[test]
    fn median_of_odd_length_ignores_order() {
        assert_relative_eq!(median(&[9.0, 1.0, 5.0]).unwrap(), 5.0);
    }

    #[test]
    fn empty_sequence_fails() {
        assert_eq!(
            Statistics::from_values(&[]).unwrap_err(),
            Error::EmptyData("statistics")
        );
        assert!(Statistics::maybe_from_values(&[]).is_none());
    }
}
