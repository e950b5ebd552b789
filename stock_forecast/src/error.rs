//! Error types for the stock_forecast crate

use forecast_math::MathError;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the stock_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Actual and predicted series differ in length
    #[error("Shape mismatch: {actual} actual values vs {predicted} predicted values")]
    ShapeMismatch { actual: usize, predicted: usize },

    /// A series that must be non-empty was empty
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// A required column is absent from a table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A table carries neither `Predicted` nor `Hybrid_Predicted`
    #[error("No prediction column found in {0}")]
    NoPredictionColumn(String),

    /// Not enough observations to fit a model
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Error raised while fitting or running a model
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A stage's input directory does not exist
    #[error("Input directory not found: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error from a price download
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Error drawing a chart
    #[error("Plot error: {0}")]
    PlotError(String),

    /// Error parsing a configuration file
    #[error("Config error: {0}")]
    ConfigError(String),

    /// Error from the numeric kernels
    #[error("Math error: {0}")]
    MathError(#[from] MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::HttpError(err.to_string())
    }
}

impl From<yahoo_finance_api::YahooError> for ForecastError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        ForecastError::HttpError(err.to_string())
    }
}

impl From<toml::de::Error> for ForecastError {
    fn from(err: toml::de::Error) -> Self {
        ForecastError::ConfigError(err.to_string())
    }
}

impl From<tempfile::PersistError> for ForecastError {
    fn from(err: tempfile::PersistError) -> Self {
        ForecastError::IoError(err.error)
    }
}
