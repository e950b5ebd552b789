//! Descriptive statistics and hypothesis tests

use crate::{mean, MathError, Result};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Unbiased sample variance (n - 1 denominator). NaN with fewer than two values.
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64
}

/// Trailing rolling mean. Positions before the window fills are `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Outcome of a two-sample t-test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTestResult {
    /// t statistic (first sample minus second)
    pub statistic: f64,
    /// Welch-Satterthwaite degrees of freedom
    pub df: f64,
    /// Two-sided p-value
    pub p_value: f64,
}

/// Welch's unequal-variance two-sample t-test, two-sided.
///
/// Degenerate samples do not error: fewer than two observations in either
/// group, or a NaN in either sample, give NaN throughout. Zero pooled standard
/// error gives an infinite statistic (p = 0), or NaN when the means are equal.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<TTestResult> {
    let nan = TTestResult {
        statistic: f64::NAN,
        df: f64::NAN,
        p_value: f64::NAN,
    };
    if a.len() < 2 || b.len() < 2 || a.iter().chain(b).any(|v| v.is_nan()) {
        return Ok(nan);
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let va = sample_variance(a) / na;
    let vb = sample_variance(b) / nb;
    let diff = mean(a) - mean(b);
    let se2 = va + vb;

    if se2 == 0.0 {
        if diff == 0.0 {
            return Ok(nan);
        }
        return Ok(TTestResult {
            statistic: diff.signum() * f64::INFINITY,
            df: f64::NAN,
            p_value: 0.0,
        });
    }

    let statistic = diff / se2.sqrt();
    let df = se2.powi(2) / (va.powi(2) / (na - 1.0) + vb.powi(2) / (nb - 1.0));

    if !statistic.is_finite() {
        return Ok(TTestResult {
            statistic,
            df,
            p_value: if statistic.is_nan() { f64::NAN } else { 0.0 },
        });
    }

    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| MathError::CalculationError(format!("Invalid t distribution: {}", e)))?;
    let p_value = (2.0 * dist.cdf(-statistic.abs())).min(1.0);

    Ok(TTestResult {
        statistic,
        df,
        p_value,
    })
}

/// Linearly interpolated quantile of an already sorted slice, `q` in `[0, 1]`
fn sorted_quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Minimum, quartiles and maximum of a sample: the numbers a box plot draws
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl FiveNumberSummary {
    /// Summarise a sample. NaN values are ignored.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if sorted.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot summarise an empty sample".to_string(),
            ));
        }
        sorted.sort_by(f64::total_cmp);

        Ok(Self {
            count: sorted.len(),
            min: sorted[0],
            q1: sorted_quantile(&sorted, 0.25),
            median: sorted_quantile(&sorted, 0.5),
            q3: sorted_quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_sample_variance() {
        assert_relative_eq!(sample_variance(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]), 32.0 / 7.0);
        assert!(sample_variance(&[1.0]).is_nan());
    }

    #[test]
    fn test_rolling_mean() {
        let rolled = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(rolled, vec![None, Some(1.5), Some(2.5), Some(3.5)]);
        assert_eq!(rolling_mean(&[1.0, 2.0], 3), vec![None, None]);
    }

    #[test]
    fn test_welch_t_test_known_values() {
        // Reference values from scipy.stats.ttest_ind(a, b, equal_var=False)
        let a = [27.5, 21.0, 19.0, 23.6, 17.0, 17.9, 16.9, 20.1, 21.9, 22.6, 23.1, 19.6, 19.0, 21.7, 21.4];
        let b = [27.1, 22.0, 20.8, 23.4, 23.4, 23.5, 25.8, 22.0, 24.8, 20.2, 21.9, 22.1, 22.9, 20.5, 24.4];
        let result = welch_t_test(&a, &b).unwrap();
        assert_relative_eq!(result.statistic, -2.46, epsilon = 0.01);
        assert_relative_eq!(result.df, 24.99, epsilon = 0.05);
        assert_relative_eq!(result.p_value, 0.021, epsilon = 0.002);
    }

    #[test]
    fn test_welch_t_test_is_antisymmetric() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 3.5, 4.0, 6.0, 7.0];
        let ab = welch_t_test(&a, &b).unwrap();
        let ba = welch_t_test(&b, &a).unwrap();
        assert_relative_eq!(ab.statistic, -ba.statistic);
        assert_relative_eq!(ab.p_value, ba.p_value);
        assert!(ab.p_value > 0.0 && ab.p_value < 1.0);
    }

    #[test]
    fn test_welch_t_test_degenerate_samples() {
        assert!(welch_t_test(&[1.0], &[1.0, 2.0]).unwrap().p_value.is_nan());
        assert!(welch_t_test(&[1.0, 1.0], &[1.0, 1.0]).unwrap().p_value.is_nan());
        assert_eq!(welch_t_test(&[1.0, 1.0], &[2.0, 2.0]).unwrap().p_value, 0.0);
        assert!(welch_t_test(&[1.0, f64::NAN], &[2.0, 3.0]).unwrap().statistic.is_nan());
    }

    #[test]
    fn test_five_number_summary() {
        let summary = FiveNumberSummary::from_values(&[5.0, 1.0, 3.0, 2.0, 4.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.max, 5.0);

        let even = FiveNumberSummary::from_values(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(even.median, 2.5);
        assert_relative_eq!(even.q1, 1.75);

        assert!(FiveNumberSummary::from_values(&[]).is_err());
    }
}
