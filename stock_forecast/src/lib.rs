//! # Stock Forecast
//!
//! Batch pipeline for forecasting daily closes of NSE-listed stocks and
//! comparing the forecasting models.
//!
//! ## Stages
//!
//! Each stage reads one directory of CSV tables and writes another. A file
//! that cannot be processed is logged and skipped; only a missing input
//! directory stops a stage.
//!
//! - Ingestion ([`ingest`]): daily OHLCV history per ticker
//! - Cleaning ([`cleaning`]) and selection ([`selection`], [`catalog`])
//! - Forecast producers ([`producers`]): ARIMA, LSTM and their hybrid blend
//! - Evaluation ([`evaluation`]): MAE, RMSE and MAPE per prediction table
//! - Aggregation ([`aggregation`]) and comparison tables ([`report`])
//! - Hypothesis testing ([`hypothesis`]): Welch t-tests between model groups
//! - Exploratory analysis ([`eda`])
//! - Charts ([`plots`]): PNG renderings of the tables above
//!
//! ## Quick Start
//!
//! ```no_run
//! use stock_forecast::config::PipelineConfig;
//! use stock_forecast::evaluation::evaluate_results;
//!
//! let config = PipelineConfig::default();
//! let report = evaluate_results(&config.dirs.arima, &config.arima_metrics_file())?;
//! println!("{} stocks evaluated, {} skipped", report.outputs.len(), report.failures.len());
//! # Ok::<(), stock_forecast::ForecastError>(())
//! ```

pub mod aggregation;
pub mod batch;
pub mod catalog;
pub mod cleaning;
pub mod cli;
pub mod config;
pub mod data;
pub mod eda;
pub mod error;
pub mod evaluation;
pub mod hypothesis;
pub mod ingest;
pub mod metrics;
pub mod models;
pub mod plots;
pub mod producers;
pub mod report;
pub mod selection;
pub mod universe;

// Re-export commonly used types
pub use crate::batch::{BatchReport, ItemFailure};
pub use crate::config::PipelineConfig;
pub use crate::data::{PredictionColumn, PredictionTable, PriceSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::metrics::{evaluate_model, CombinedRecord, ForecastMetrics, Metric, MetricRecord, Model};
pub use crate::models::{FittedModel, ForecastModel};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
