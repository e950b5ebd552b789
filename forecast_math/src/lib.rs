//! # Forecast Math
//!
//! Numeric building blocks shared by the forecast producers and the
//! evaluation stages. Nothing in this crate touches the filesystem.
//!
//! - [`scaling`]: min-max feature scaling with an inverse transform
//! - [`linalg`]: dense linear systems and ordinary least squares
//! - [`stats`]: descriptive statistics, Welch's t-test, five-number summaries

use thiserror::Error;

pub mod linalg;
pub mod scaling;
pub mod stats;

pub use scaling::MinMaxScaler;
pub use stats::{welch_t_test, FiveNumberSummary, TTestResult};

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Arithmetic mean of a slice. Returns NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
