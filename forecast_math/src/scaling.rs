//! Min-max feature scaling
//!
//! Maps a series linearly onto a target range (by default `[0, 1]`) and back.
//! A constant series maps onto the lower bound of the range.

use crate::{MathError, Result};

/// Linear scaler fitted on the observed minimum and maximum of a series
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    data_min: f64,
    data_max: f64,
    range_min: f64,
    range_max: f64,
}

impl MinMaxScaler {
    /// Fit a scaler onto `[0, 1]`
    pub fn fit(values: &[f64]) -> Result<Self> {
        Self::fit_with_range(values, 0.0, 1.0)
    }

    /// Fit a scaler onto `[range_min, range_max]`
    pub fn fit_with_range(values: &[f64], range_min: f64, range_max: f64) -> Result<Self> {
        if values.is_empty() {
            return Err(MathError::InsufficientData(
                "Cannot fit a scaler on an empty series".to_string(),
            ));
        }
        if range_min >= range_max {
            return Err(MathError::InvalidInput(format!(
                "Scaling range must be increasing, got [{}, {}]",
                range_min, range_max
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Cannot fit a scaler on non-finite values".to_string(),
            ));
        }

        let data_min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let data_max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            data_min,
            data_max,
            range_min,
            range_max,
        })
    }

    fn scale(&self) -> f64 {
        let span = self.data_max - self.data_min;
        if span == 0.0 {
            1.0
        } else {
            (self.range_max - self.range_min) / span
        }
    }

    /// Scale a single value
    pub fn transform_value(&self, value: f64) -> f64 {
        (value - self.data_min) * self.scale() + self.range_min
    }

    /// Undo the scaling of a single value
    pub fn inverse_value(&self, scaled: f64) -> f64 {
        (scaled - self.range_min) / self.scale() + self.data_min
    }

    /// Scale every value of a series
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_value(v)).collect()
    }

    /// Undo the scaling of every value of a series
    pub fn inverse_transform(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|&v| self.inverse_value(v)).collect()
    }

    /// Minimum seen while fitting
    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    /// Maximum seen while fitting
    pub fn data_max(&self) -> f64 {
        self.data_max
    }
}
