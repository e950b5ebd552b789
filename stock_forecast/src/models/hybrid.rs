//! Weighted blend of an ARIMA and an LSTM forecast

use crate::error::{ForecastError, Result};
use crate::models::arima::{ArimaModel, FittedArima};
use crate::models::lstm::{FittedLstm, LstmModel};
use crate::models::{FittedModel, ForecastModel};

fn check_weight(weight: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(ForecastError::InvalidParameter(format!(
            "Hybrid weight must be in [0, 1], got {}",
            weight
        )));
    }
    Ok(())
}

/// `weight * arima + (1 - weight) * lstm`, elementwise.
///
/// The two series are aligned on their ends: only the trailing values both
/// have are blended.
pub fn blend(arima: &[f64], lstm: &[f64], weight: f64) -> Result<Vec<f64>> {
    check_weight(weight)?;
    let n = arima.len().min(lstm.len());
    Ok(arima[arima.len() - n..]
        .iter()
        .zip(&lstm[lstm.len() - n..])
        .map(|(a, l)| weight * a + (1.0 - weight) * l)
        .collect())
}

/// Hybrid ARIMA + LSTM model
#[derive(Debug, Clone)]
pub struct HybridModel {
    name: String,
    arima: ArimaModel,
    lstm: LstmModel,
    weight: f64,
}

impl HybridModel {
    pub fn new(arima: ArimaModel, lstm: LstmModel, weight: f64) -> Result<Self> {
        check_weight(weight)?;
        Ok(Self {
            name: format!("Hybrid({:.2} {} + {:.2} {})", weight, arima.name(), 1.0 - weight, lstm.name()),
            arima,
            lstm,
            weight,
        })
    }
}

impl ForecastModel for HybridModel {
    type Fitted = FittedHybrid;

    fn fit(&self, series: &[f64]) -> Result<FittedHybrid> {
        let arima = self.arima.fit(series)?;
        let lstm = self.lstm.fit(series)?;
        FittedHybrid::from_parts(arima, lstm, self.weight)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Blend of two models fitted on the same series
#[derive(Debug, Clone)]
pub struct FittedHybrid {
    name: String,
    arima: FittedArima,
    lstm: FittedLstm,
    weight: f64,
    fitted: Vec<f64>,
}

impl FittedHybrid {
    /// Combine existing fits, so a producer that already fitted both models
    /// does not fit them again
    pub fn from_parts(arima: FittedArima, lstm: FittedLstm, weight: f64) -> Result<Self> {
        let fitted = blend(arima.fitted_values(), lstm.fitted_values(), weight)?;
        Ok(Self {
            name: format!("Hybrid({}, {})", arima.name(), lstm.name()),
            arima,
            lstm,
            weight,
            fitted,
        })
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn arima(&self) -> &FittedArima {
        &self.arima
    }

    pub fn lstm(&self) -> &FittedLstm {
        &self.lstm
    }
}

impl FittedModel for FittedHybrid {
    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn warmup(&self) -> usize {
        self.arima.warmup().max(self.lstm.warmup())
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let arima = self.arima.forecast(horizon)?;
        let lstm = self.lstm.forecast(horizon)?;
        blend(&arima, &lstm, self.weight)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
