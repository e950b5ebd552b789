//! Pipeline configuration
//!
//! Every stage takes its directories from a [`PipelineConfig`]. The defaults
//! reproduce the directory layout the stages have always used, so a config
//! file only needs to name what it overrides.

use crate::error::{ForecastError, Result};
use crate::metrics::Model;
use crate::models::arima::ArimaOrder;
use crate::models::lstm::LstmConfig;
use crate::universe::{default_selection, default_universe, TickerInfo};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory layout shared by all stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Directories {
    pub raw: PathBuf,
    pub clean: PathBuf,
    pub selected: PathBuf,
    pub arima: PathBuf,
    pub lstm: PathBuf,
    pub hybrid: PathBuf,
    pub evaluation: PathBuf,
    pub eda: PathBuf,
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            raw: PathBuf::from("stock_data"),
            clean: PathBuf::from("clean_stock_data"),
            selected: PathBuf::from("selected_stock_data"),
            arima: PathBuf::from("arima_prediction_results"),
            lstm: PathBuf::from("lstm_results"),
            hybrid: PathBuf::from("hybrid_results"),
            evaluation: PathBuf::from("evaluation_results"),
            eda: PathBuf::from("eda_results"),
        }
    }
}

/// Full configuration for the batch stages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dirs: Directories,
    /// Tickers to download, with sectors
    pub universe: Vec<TickerInfo>,
    /// Tickers carried into modelling
    pub selection: Vec<String>,
    /// First day requested from the price source
    pub start_date: NaiveDate,
    pub arima: ArimaOrder,
    pub lstm: LstmConfig,
    /// Weight of the ARIMA series in the hybrid blend
    pub hybrid_weight: f64,
    /// Window of the EDA rolling mean
    pub rolling_window: usize,
    /// Ticker catalog produced from the clean data
    pub catalog_file: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            dirs: Directories::default(),
            universe: default_universe(),
            selection: default_selection(),
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or(NaiveDate::MIN),
            arima: ArimaOrder::default(),
            lstm: LstmConfig::default(),
            hybrid_weight: 0.5,
            rolling_window: 30,
            catalog_file: PathBuf::from("nse_stock_data_with_name_sector_date_range.csv"),
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    /// Read the given file, or fall back to the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.hybrid_weight) {
            return Err(ForecastError::ConfigError(format!(
                "hybrid_weight must be within [0, 1], got {}",
                self.hybrid_weight
            )));
        }
        if self.rolling_window == 0 {
            return Err(ForecastError::ConfigError(
                "rolling_window must be positive".to_string(),
            ));
        }
        self.lstm.validate()
    }

    /// Metrics table of the ARIMA predictions
    pub fn arima_metrics_file(&self) -> PathBuf {
        self.dirs.evaluation.join("arima_evaluation_metrics.csv")
    }

    /// Metrics table of the LSTM predictions
    pub fn lstm_metrics_file(&self) -> PathBuf {
        self.dirs.evaluation.join("lstm_evaluation_metrics.csv")
    }

    /// Metrics table of the hybrid predictions
    pub fn hybrid_metrics_file(&self) -> PathBuf {
        self.dirs.evaluation.join("hybrid_evaluation_metrics.csv")
    }

    /// Prediction directory and metrics table of each model, in aggregation order
    pub fn model_outputs(&self) -> Vec<(Model, PathBuf, PathBuf)> {
        vec![
            (Model::Lstm, self.dirs.lstm.clone(), self.lstm_metrics_file()),
            (Model::Hybrid, self.dirs.hybrid.clone(), self.hybrid_metrics_file()),
            (Model::Arima, self.dirs.arima.clone(), self.arima_metrics_file()),
        ]
    }

    /// Combined metrics of all three models
    pub fn combined_metrics_file(&self) -> PathBuf {
        self.dirs.evaluation.join("combined_evaluation_metrics.csv")
    }

    /// Per-metric comparison exports
    pub fn plots_dir(&self) -> PathBuf {
        self.dirs.evaluation.join("plots")
    }

    /// Hypothesis test exports
    pub fn hypothesis_dir(&self) -> PathBuf {
        self.dirs.evaluation.join("hypothesis_plots")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.dirs.arima, PathBuf::from("arima_prediction_results"));
        assert_eq!(config.arima, ArimaOrder { p: 5, d: 1, q: 0 });
        assert_eq!(config.lstm.look_back, 60);
        assert_eq!(config.hybrid_weight, 0.5);
        assert_eq!(
            config.combined_metrics_file(),
            PathBuf::from("evaluation_results/combined_evaluation_metrics.csv")
        );
    }

    #[test]
    fn test_partial_override() {
        let text = r#"
            hybrid_weight = 0.25
            selection = ["TCS.NS"]

            [dirs]
            evaluation = "out/eval"

            [lstm]
            epochs = 3
        "#;
        let config = PipelineConfig::from_toml_str(text).unwrap();
        assert_eq!(config.hybrid_weight, 0.25);
        assert_eq!(config.selection, vec!["TCS.NS".to_string()]);
        assert_eq!(config.dirs.evaluation, PathBuf::from("out/eval"));
        assert_eq!(config.dirs.raw, PathBuf::from("stock_data"));
        assert_eq!(config.lstm.epochs, 3);
        assert_eq!(config.lstm.look_back, 60);
    }

    #[test]
    fn test_invalid_values() {
        assert!(PipelineConfig::from_toml_str("hybrid_weight = 1.5").is_err());
        assert!(PipelineConfig::from_toml_str("rolling_window = 0").is_err());
        assert!(PipelineConfig::from_toml_str("hybrid_weight = \"half\"").is_err());
    }
}
