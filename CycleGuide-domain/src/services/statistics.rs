//! Descriptive statistics over numeric samples.
//!
//! Standard deviation is the population variant (divide by N). Functions
//! that need at least one observation return [`StatisticsError::EmptyInput`]
//! rather than producing NaN.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::entities::population::PopulationFieldModel;

/// Width of a distribution bucket
const BUCKET_WIDTH: i64 = 3;

/// Statistics errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatisticsError {
    /// The sample had no observations
    #[error("Cannot compute {0} of an empty sample")]
    EmptyInput(&'static str),
}

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Result<f64, StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::EmptyInput("mean"));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median; even-sized samples average the two middle values
pub fn median(values: &[f64]) -> Result<f64, StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::EmptyInput("median"));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Population standard deviation
pub fn standard_deviation(values: &[f64]) -> Result<f64, StatisticsError> {
    if values.is_empty() {
        return Err(StatisticsError::EmptyInput("standard deviation"));
    }

    let mean = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;

    Ok(variance.sqrt())
}

/// Fraction of observations per width-3 bucket.
///
/// A value lands in the bucket starting at `floor(v / 3) * 3`, labelled
/// `"lo-hi"`. Fractions are rounded to two decimals; empty buckets are absent.
pub fn distribution(values: &[f64]) -> BTreeMap<String, f64> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values {
        let low = (value / BUCKET_WIDTH as f64).floor() as i64 * BUCKET_WIDTH;
        let label = format!("{}-{}", low, low + BUCKET_WIDTH - 1);
        *counts.entry(label).or_insert(0) += 1;
    }

    let total = values.len() as f64;
    counts
        .into_iter()
        .map(|(label, count)| (label, round_to_hundredths(count as f64 / total)))
        .collect()
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarise a field into a [`PopulationFieldModel`]
///
/// `with_range` controls whether min and max are recorded.
pub fn summarize(values: &[f64], with_range: bool) -> Result<PopulationFieldModel, StatisticsError> {
    let (min, max) = if with_range {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (Some(min), Some(max))
    } else {
        (None, None)
    };

    Ok(PopulationFieldModel {
        mean: mean(values)?,
        median: median(values)?,
        standard_deviation: standard_deviation(values)?,
        min,
        max,
        distribution: distribution(values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean() {
        assert!(approx_eq(mean(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5));
        assert_eq!(mean(&[]), Err(StatisticsError::EmptyInput("mean")));
    }

    #[test]
    fn test_median_even_and_odd() {
        assert!(approx_eq(median(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 2.5));
        assert!(approx_eq(median(&[1.0, 2.0, 3.0]).unwrap(), 2.0));
        assert!(approx_eq(median(&[3.0, 1.0, 2.0]).unwrap(), 2.0));
        assert!(median(&[]).is_err());
    }

    #[test]
    fn test_standard_deviation_is_population_variant() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_eq(standard_deviation(&values).unwrap(), 2.0));
    }

    #[test]
    fn test_standard_deviation_of_single_value_is_zero() {
        assert!(approx_eq(standard_deviation(&[1.0]).unwrap(), 0.0));
        assert!(approx_eq(standard_deviation(&[31.0]).unwrap(), 0.0));
        assert!(standard_deviation(&[]).is_err());
    }

    #[test]
    fn test_distribution_buckets() {
        let values = [21.0, 22.0, 23.0, 24.0, 25.0, 26.0, 27.0];
        let dist = distribution(&values);

        assert_eq!(dist.len(), 3);
        assert!(approx_eq(dist["21-23"], 0.43));
        assert!(approx_eq(dist["24-26"], 0.43));
        assert!(approx_eq(dist["27-29"], 0.14));

        let total: f64 = dist.values().sum();
        assert!((total - 1.0).abs() < 0.011, "fractions sum to {}", total);
    }

    #[test]
    fn test_distribution_skips_empty_buckets() {
        let dist = distribution(&[3.0, 30.0]);
        assert_eq!(dist.len(), 2);
        assert!(dist.contains_key("3-5"));
        assert!(dist.contains_key("30-32"));
        assert!(!dist.contains_key("6-8"));
        assert!(distribution(&[]).is_empty());
    }

    #[test]
    fn test_summarize_with_and_without_range() {
        let values = [26.0, 28.0, 30.0];
        let with_range = summarize(&values, true).unwrap();
        assert_eq!(with_range.min, Some(26.0));
        assert_eq!(with_range.max, Some(30.0));
        assert!(approx_eq(with_range.mean, 28.0));
        assert!(approx_eq(with_range.median, 28.0));

        let without_range = summarize(&values, false).unwrap();
        assert_eq!(without_range.min, None);
        assert_eq!(without_range.max, None);

        assert!(summarize(&[], true).is_err());
    }
}
