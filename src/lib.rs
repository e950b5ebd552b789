//! # NSE Forecast
//!
//! Umbrella crate for the NSE stock forecast pipeline.
//!
//! - [`forecast_math`]: scaling, least squares and statistical tests
//! - [`stock_forecast`]: the pipeline stages, models and their binaries

pub use forecast_math;
pub use stock_forecast;
