//! ARIMA models for time series forecasting
//!
//! Only the autoregressive part is estimated: the series is differenced `d`
//! times and an AR(p) without constant is fitted to the result by conditional
//! least squares. Moving-average terms are not supported.

use crate::error::{ForecastError, Result};
use crate::models::{FittedModel, ForecastModel};
use forecast_math::linalg::least_squares;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// `(p, d, q)` order of an ARIMA model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self { p: 5, d: 1, q: 0 }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.p, self.d, self.q)
    }
}

/// Difference a series `d` times
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..d {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    name: String,
    order: ArimaOrder,
}

impl ArimaModel {
    /// Create a new ARIMA model. A non-zero MA order is rejected.
    pub fn new(order: ArimaOrder) -> Result<Self> {
        if order.q > 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "MA order must be 0, got ARIMA{}",
                order
            )));
        }
        Ok(Self {
            name: format!("ARIMA({},{},{})", order.p, order.d, order.q),
            order,
        })
    }

    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Observations needed for the least-squares problem to be overdetermined
    fn min_observations(&self) -> usize {
        self.order.d + 2 * self.order.p + 1
    }
}

/// Predicted value of `w[j]` from its `p` predecessors; missing lags count as zero
fn ar_prediction(w: &[f64], coefficients: &[f64], j: usize) -> f64 {
    coefficients
        .iter()
        .enumerate()
        .take_while(|(i, _)| *i < j)
        .map(|(i, phi)| phi * w[j - 1 - i])
        .sum()
}

impl ForecastModel for ArimaModel {
    type Fitted = FittedArima;

    fn fit(&self, series: &[f64]) -> Result<FittedArima> {
        let ArimaOrder { p, d, .. } = self.order;

        if series.len() < self.min_observations() {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs at least {} observations, got {}",
                self.name,
                self.min_observations(),
                series.len()
            )));
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::DataError(
                "Series contains non-finite values".to_string(),
            ));
        }

        let w = difference(series, d);

        let coefficients = if p == 0 {
            Vec::new()
        } else {
            let design: Vec<Vec<f64>> = (p..w.len())
                .map(|t| (1..=p).map(|lag| w[t - lag]).collect())
                .collect();
            least_squares(&design, &w[p..]).map_err(|e| {
                ForecastError::ModelError(format!("{} estimation failed: {}", self.name, e))
            })?
        };

        let nobs = w.len() - p;
        let sse: f64 = (p..w.len())
            .map(|t| (w[t] - ar_prediction(&w, &coefficients, t)).powi(2))
            .sum();
        let sigma2 = sse / nobs as f64;

        // One-step-ahead level prediction: the observation minus the
        // innovation of the differenced model. The first d rows are kept as observed.
        let mut fitted = series[..d].to_vec();
        fitted.extend(
            (0..w.len()).map(|j| series[j + d] - w[j] + ar_prediction(&w, &coefficients, j)),
        );

        // Last value of each difference level, used to integrate forecasts
        let tails = (0..d)
            .map(|k| {
                let level = difference(series, k);
                level[level.len() - 1]
            })
            .collect();

        Ok(FittedArima {
            name: self.name.clone(),
            order: self.order,
            coefficients,
            sigma2,
            nobs,
            differenced: w,
            tails,
            fitted,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct FittedArima {
    name: String,
    order: ArimaOrder,
    coefficients: Vec<f64>,
    sigma2: f64,
    nobs: usize,
    differenced: Vec<f64>,
    tails: Vec<f64>,
    fitted: Vec<f64>,
}

impl FittedArima {
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// AR coefficients, lag 1 first
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Residual variance of the differenced model
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Observations used in the conditional likelihood
    pub fn nobs(&self) -> usize {
        self.nobs
    }

    /// Gaussian log-likelihood conditional on the first `p` differenced values
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * PI * self.sigma2).ln() + 1.0)
    }

    /// Akaike information criterion, counting the residual variance as a parameter
    pub fn aic(&self) -> f64 {
        2.0 * (self.coefficients.len() + 1) as f64 - 2.0 * self.log_likelihood()
    }

    /// Plain-text report of the fit
    pub fn summary(&self, series_name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("ARIMA Model Results: {}\n", series_name));
        out.push_str(&format!("Order (p, d, q):      {}\n", self.order));
        out.push_str(&format!("Observations:         {}\n", self.nobs));
        out.push_str(&format!("Log Likelihood:       {:.4}\n", self.log_likelihood()));
        out.push_str(&format!("AIC:                  {:.4}\n", self.aic()));
        out.push_str(&format!("Residual variance:    {:.6}\n", self.sigma2));
        out.push_str("Coefficients:\n");
        if self.coefficients.is_empty() {
            out.push_str("  (none)\n");
        }
        for (i, phi) in self.coefficients.iter().enumerate() {
            out.push_str(&format!("  ar.L{:<3} {:>14.6}\n", i + 1, phi));
        }
        out
    }
}

impl FittedModel for FittedArima {
    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let mut w = self.differenced.clone();
        let mut tails = self.tails.clone();
        let mut forecasts = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let next = ar_prediction(&w, &self.coefficients, w.len());
            w.push(next);

            let mut level = next;
            for tail in tails.iter_mut().rev() {
                level += *tail;
                *tail = level;
            }
            forecasts.push(level);
        }

        Ok(forecasts)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Levels whose first difference follows w[t] = 0.5 * w[t - 1]
    fn geometric_levels(n: usize) -> Vec<f64> {
        let mut levels = vec![100.0];
        let mut step = 8.0;
        for _ in 1..n {
            let last = levels[levels.len() - 1];
            levels.push(last + step);
            step *= 0.5;
        }
        levels
    }

    #[test]
    fn test_difference() {
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 1), vec![3.0, 5.0, 7.0]);
        assert_eq!(difference(&[1.0, 4.0, 9.0, 16.0], 2), vec![2.0, 2.0]);
        assert_eq!(difference(&[1.0, 2.0], 0), vec![1.0, 2.0]);
    }

    #[test]
    fn test_rejects_ma_terms() {
        assert!(matches!(
            ArimaModel::new(ArimaOrder { p: 1, d: 1, q: 1 }),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_insufficient_data() {
        let model = ArimaModel::new(ArimaOrder::default()).unwrap();
        let result = model.fit(&[1.0, 2.0, 3.0]);
        assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
    }

    #[test]
    fn test_recovers_ar_coefficient() {
        let series = geometric_levels(12);
        let model = ArimaModel::new(ArimaOrder { p: 1, d: 1, q: 0 }).unwrap();
        let fitted = model.fit(&series).unwrap();

        assert_relative_eq!(fitted.coefficients()[0], 0.5, epsilon = 1e-9);
        assert!(fitted.sigma2() < 1e-12);

        let values = fitted.fitted_values();
        assert_eq!(values.len(), series.len());
        assert_eq!(values[0], series[0]);
        // No lag available for the first difference: naive forecast
        assert_eq!(values[1], series[0]);
        for t in 2..series.len() {
            assert_relative_eq!(values[t], series[t], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_forecast_integrates_differences() {
        let series = geometric_levels(12);
        let model = ArimaModel::new(ArimaOrder { p: 1, d: 1, q: 0 }).unwrap();
        let fitted = model.fit(&series).unwrap();

        let expected = geometric_levels(15);
        let forecast = fitted.forecast(3).unwrap();
        for (f, e) in forecast.iter().zip(&expected[12..]) {
            assert_relative_eq!(*f, *e, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_second_difference_extrapolates_line() {
        let series: Vec<f64> = (0..10).map(|t| 3.0 + 2.0 * t as f64).collect();
        let model = ArimaModel::new(ArimaOrder { p: 0, d: 2, q: 0 }).unwrap();
        let fitted = model.fit(&series).unwrap();

        assert_eq!(&fitted.fitted_values()[..2], &series[..2]);
        assert_relative_eq!(fitted.fitted_values()[5], series[5]);

        let forecast = fitted.forecast(2).unwrap();
        assert_relative_eq!(forecast[0], 23.0);
        assert_relative_eq!(forecast[1], 25.0);
    }

    #[test]
    fn test_summary_reports_order() {
        let series = geometric_levels(12);
        let model = ArimaModel::new(ArimaOrder { p: 1, d: 1, q: 0 }).unwrap();
        let summary = model.fit(&series).unwrap().summary("TCS.NS");
        assert!(summary.contains("TCS.NS"));
        assert!(summary.contains("(1, 1, 0)"));
        assert!(summary.contains("ar.L1"));
    }
}
