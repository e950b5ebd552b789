//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Error metrics of one forecast against the observed series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error, in percent
    pub mape: f64,
}

impl std::fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Performance Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        Ok(())
    }
}

/// Evaluate predicted values against actual values.
///
/// Both series must have the same, non-zero length. MAPE divides by every
/// actual value as is: a zero actual makes it infinite or NaN, and that value
/// is returned rather than filtered out.
pub fn evaluate_model(actual: &[f64], predicted: &[f64]) -> Result<ForecastMetrics> {
    if actual.len() != predicted.len() {
        return Err(ForecastError::ShapeMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(ForecastError::EmptySeries(
            "Cannot evaluate an empty forecast".to_string(),
        ));
    }

    let n = actual.len() as f64;

    let errors: Vec<f64> = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &p)| a - p)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let rmse = (errors.iter().map(|e| e.powi(2)).sum::<f64>() / n).sqrt();
    let mape = actual
        .iter()
        .zip(&errors)
        .map(|(&a, &e)| (e / a).abs())
        .sum::<f64>()
        / n
        * 100.0;

    Ok(ForecastMetrics { mae, rmse, mape })
}

/// Model family that produced a set of predictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Model {
    #[serde(rename = "ARIMA")]
    Arima,
    #[serde(rename = "LSTM")]
    Lstm,
    #[serde(rename = "Hybrid")]
    Hybrid,
}

impl Model {
    /// Every model, in the column order used by comparison exports
    pub const ALL: [Model; 3] = [Model::Arima, Model::Lstm, Model::Hybrid];

    pub fn label(&self) -> &'static str {
        match self {
            Model::Arima => "ARIMA",
            Model::Lstm => "LSTM",
            Model::Hybrid => "Hybrid",
        }
    }

    /// Suffix a producer appends to the ticker in its file names
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Model::Arima => "_arima_predictions",
            Model::Lstm => "_lstm_predictions",
            Model::Hybrid => "_hybrid_predictions",
        }
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// One row of a per-model metrics table: `Stock,MAE,RMSE,MAPE`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    #[serde(rename = "Stock")]
    pub stock: String,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAPE")]
    pub mape: f64,
}

impl MetricRecord {
    pub fn new(stock: &str, metrics: ForecastMetrics) -> Self {
        Self {
            stock: stock.to_string(),
            mae: metrics.mae,
            rmse: metrics.rmse,
            mape: metrics.mape,
        }
    }
}

/// One row of the combined table: `Stock,MAE,RMSE,MAPE,Model`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    #[serde(rename = "Stock")]
    pub stock: String,
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "MAPE")]
    pub mape: f64,
    #[serde(rename = "Model")]
    pub model: Model,
}

/// Metric columns that comparisons are run over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Mae,
    Rmse,
    Mape,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Mae, Metric::Rmse, Metric::Mape];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::Mae => "MAE",
            Metric::Rmse => "RMSE",
            Metric::Mape => "MAPE",
        }
    }

    /// Read this metric from a combined row
    pub fn value(&self, record: &CombinedRecord) -> f64 {
        match self {
            Metric::Mae => record.mae,
            Metric::Rmse => record.rmse,
            Metric::Mape => record.mape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_evaluate_model_values() {
        let actual = [10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = [12.0, 18.0, 33.0, 37.0, 52.0];
        let metrics = evaluate_model(&actual, &predicted).unwrap();

        assert_relative_eq!(metrics.mae, 2.4, epsilon = 1e-12);
        assert_relative_eq!(metrics.rmse, 6.0_f64.sqrt(), epsilon = 1e-12);
        // (0.2 + 0.1 + 0.1 + 0.075 + 0.04) / 5 * 100
        assert_relative_eq!(metrics.mape, 10.3, epsilon = 1e-10);
    }

    #[test]
    fn test_model_labels() {
        assert_eq!(Model::Arima.to_string(), "ARIMA");
        assert_eq!(Model::Lstm.file_suffix(), "_lstm_predictions");
        assert_eq!(Metric::Rmse.label(), "RMSE");
    }
}
