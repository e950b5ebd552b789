//! Forecasting models for daily close series
//!
//! A [`ForecastModel`] holds hyperparameters only. Fitting it on a series
//! produces a [`FittedModel`], which carries the in-sample one-step-ahead
//! predictions the producer stages write out, and can forecast beyond the end
//! of the series.

use crate::error::Result;
use std::fmt::Debug;

/// Model fitted to one series
pub trait FittedModel: Debug {
    /// In-sample one-step-ahead predictions.
    ///
    /// These line up with the end of the training series: the first
    /// [`warmup`](FittedModel::warmup) observations have no prediction.
    fn fitted_values(&self) -> &[f64];

    /// Number of leading observations without a fitted value
    fn warmup(&self) -> usize {
        0
    }

    /// Recursive forecast of the next `horizon` values
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be fitted to a series
pub trait ForecastModel: Debug + Clone {
    /// The type of fitted model produced
    type Fitted: FittedModel;

    /// Fit the model to a series of observations in time order
    fn fit(&self, series: &[f64]) -> Result<Self::Fitted>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod arima;
pub mod hybrid;
pub mod lstm;

pub use arima::{ArimaModel, ArimaOrder, FittedArima};
pub use hybrid::{blend, FittedHybrid, HybridModel};
pub use lstm::{FittedLstm, LstmConfig, LstmModel};
