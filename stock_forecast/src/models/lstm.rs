//! Stacked LSTM network for one-step-ahead prediction
//!
//! The series is min-max scaled to `[0, 1]` and cut into sliding windows of
//! `look_back` values, each labelled with the value that follows it. The
//! windows go through one or more `burn` LSTM layers (only the last time step
//! of the top layer is kept) and a linear output unit. Training minimises mean
//! squared error with Adam over shuffled mini-batches on the autodiff ndarray
//! backend. Weight initialisation and batch order are both seeded, so a fit is
//! reproducible.

use crate::error::{ForecastError, Result};
use crate::models::{FittedModel, ForecastModel};
use burn::backend::ndarray::NdArrayDevice;
use burn::backend::{Autodiff, NdArray};
use burn::module::{AutodiffModule, Module};
use burn::nn::loss::{MseLoss, Reduction};
use burn::nn::{Linear, LinearConfig, Lstm, LstmConfig as LstmLayerConfig};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Tensor, TensorData};
use forecast_math::MinMaxScaler;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::debug;

type InferenceBackend = NdArray<f32>;
type TrainBackend = Autodiff<InferenceBackend>;

/// Guards the backend's global RNG between seeding and weight initialisation
static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Hyperparameters of the LSTM producer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LstmConfig {
    /// Number of past values fed to the network per prediction
    pub look_back: usize,
    /// Units of each stacked LSTM layer, bottom first
    pub hidden_units: Vec<usize>,
    pub epochs: usize,
    pub batch_size: usize,
    /// Adam step size
    pub learning_rate: f64,
    /// Seed for weight initialisation and batch shuffling
    pub seed: u64,
}

impl Default for LstmConfig {
    fn default() -> Self {
        Self {
            look_back: 60,
            hidden_units: vec![50, 50],
            epochs: 20,
            batch_size: 32,
            learning_rate: 0.001,
            seed: 42,
        }
    }
}

impl LstmConfig {
    pub fn validate(&self) -> Result<()> {
        if self.look_back == 0 {
            return Err(ForecastError::InvalidParameter(
                "look_back must be positive".to_string(),
            ));
        }
        if self.hidden_units.is_empty() || self.hidden_units.contains(&0) {
            return Err(ForecastError::InvalidParameter(
                "hidden_units must name at least one layer, each with at least one unit"
                    .to_string(),
            ));
        }
        if self.epochs == 0 || self.batch_size == 0 {
            return Err(ForecastError::InvalidParameter(
                "epochs and batch_size must be positive".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// LSTM layers topped by one linear unit
#[derive(Module, Debug)]
struct Network<B: Backend> {
    layers: Vec<Lstm<B>>,
    output: Linear<B>,
}

impl<B: Backend> Network<B> {
    fn new(hidden_units: &[usize], device: &B::Device) -> Self {
        let mut d_input = 1;
        let layers = hidden_units
            .iter()
            .map(|&units| {
                let layer = LstmLayerConfig::new(d_input, units, true).init(device);
                d_input = units;
                layer
            })
            .collect();
        Self {
            layers,
            output: LinearConfig::new(d_input, 1).init(device),
        }
    }

    /// `[batch, look_back, 1]` windows to `[batch, 1]` predictions
    fn forward(&self, windows: Tensor<B, 3>) -> Tensor<B, 2> {
        let mut x = windows;
        for layer in &self.layers {
            let (sequence, _) = layer.forward(x, None);
            x = sequence;
        }
        let [batch, steps, units] = x.dims();
        let last = x.slice([0..batch, steps - 1..steps, 0..units]).reshape([batch, units]);
        self.output.forward(last)
    }
}

/// Stack the windows starting at `starts` into a `[batch, look_back, 1]` tensor
fn window_tensor<B: Backend>(
    scaled: &[f64],
    starts: &[usize],
    look_back: usize,
    device: &B::Device,
) -> Tensor<B, 3> {
    let values: Vec<f32> = starts
        .iter()
        .flat_map(|&i| scaled[i..i + look_back].iter().map(|&v| v as f32))
        .collect();
    Tensor::from_data(TensorData::new(values, [starts.len(), look_back, 1]), device)
}

fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f64>> {
    let values = tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| ForecastError::ModelError(format!("Cannot read network output: {:?}", e)))?;
    Ok(values.into_iter().map(f64::from).collect())
}

/// LSTM forecaster
#[derive(Debug, Clone)]
pub struct LstmModel {
    name: String,
    config: LstmConfig,
}

impl LstmModel {
    pub fn new(config: LstmConfig) -> Result<Self> {
        config.validate()?;
        let units: Vec<String> = config.hidden_units.iter().map(|u| u.to_string()).collect();
        Ok(Self {
            name: format!("LSTM(look_back={}, units={})", config.look_back, units.join("-")),
            config,
        })
    }

    pub fn config(&self) -> &LstmConfig {
        &self.config
    }

    fn init_network(&self, device: &NdArrayDevice) -> Result<Network<TrainBackend>> {
        let _guard = INIT_LOCK
            .lock()
            .map_err(|_| ForecastError::ModelError("LSTM initialisation lock poisoned".to_string()))?;
        TrainBackend::seed(self.config.seed);
        let network = Network::new(&self.config.hidden_units, device);
        // Parameters initialise on first use; draw them while the seed is held
        let _ = network.forward(Tensor::zeros([1, self.config.look_back, 1], device));
        Ok(network)
    }
}

impl ForecastModel for LstmModel {
    type Fitted = FittedLstm;

    fn fit(&self, series: &[f64]) -> Result<FittedLstm> {
        let look_back = self.config.look_back;
        if series.len() <= look_back {
            return Err(ForecastError::InsufficientData(format!(
                "{} needs more than {} observations, got {}",
                self.name,
                look_back,
                series.len()
            )));
        }

        let scaler = MinMaxScaler::fit(series)?;
        let scaled = scaler.transform(series);
        let samples = scaled.len() - look_back;
        let device = NdArrayDevice::default();

        let mut network = self.init_network(&device)?;
        let mut optimizer = AdamConfig::new().with_epsilon(1e-7).init();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut order: Vec<usize> = (0..samples).collect();
        let mut loss = f64::NAN;

        for epoch in 0..self.config.epochs {
            order.shuffle(&mut rng);
            let mut total = 0.0;
            for batch in order.chunks(self.config.batch_size) {
                let windows = window_tensor::<TrainBackend>(&scaled, batch, look_back, &device);
                let targets: Vec<f32> = batch.iter().map(|&i| scaled[i + look_back] as f32).collect();
                let targets = Tensor::<TrainBackend, 2>::from_data(
                    TensorData::new(targets, [batch.len(), 1]),
                    &device,
                );

                let batch_loss = MseLoss::new().forward(network.forward(windows), targets, Reduction::Mean);
                total += batch_loss.clone().into_scalar().elem::<f64>() * batch.len() as f64;

                let grads = GradientsParams::from_grads(batch_loss.backward(), &network);
                network = optimizer.step(self.config.learning_rate, network, grads);
            }
            loss = total / samples as f64;
            debug!(model = %self.name, epoch = epoch + 1, loss, "epoch finished");
        }

        if !loss.is_finite() {
            return Err(ForecastError::ModelError(format!(
                "{} training diverged (loss {})",
                self.name, loss
            )));
        }

        let network = network.valid();
        let starts: Vec<usize> = (0..samples).collect();
        let scaled_fit = tensor_values(network.forward(window_tensor(&scaled, &starts, look_back, &device)))?;

        Ok(FittedLstm {
            name: self.name.clone(),
            look_back,
            network,
            device,
            fitted: scaler.inverse_transform(&scaled_fit),
            scaler,
            tail: scaled[samples..].to_vec(),
            loss,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Trained LSTM with its scaler
#[derive(Debug, Clone)]
pub struct FittedLstm {
    name: String,
    look_back: usize,
    scaler: MinMaxScaler,
    network: Network<InferenceBackend>,
    device: NdArrayDevice,
    /// Last `look_back` scaled observations
    tail: Vec<f64>,
    fitted: Vec<f64>,
    loss: f64,
}

impl FittedLstm {
    /// Mean squared error on the scaled series in the final epoch
    pub fn training_loss(&self) -> f64 {
        self.loss
    }

    fn predict_next(&self, window: &[f64]) -> Result<f64> {
        let input = window_tensor(window, &[window.len() - self.look_back], self.look_back, &self.device);
        tensor_values(self.network.forward(input))?
            .first()
            .copied()
            .ok_or_else(|| ForecastError::ModelError("Network returned no prediction".to_string()))
    }
}

impl FittedModel for FittedLstm {
    fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    fn warmup(&self) -> usize {
        self.look_back
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let mut window = self.tail.clone();
        let mut forecasts = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let next = self.predict_next(&window)?;
            window.push(next);
            forecasts.push(self.scaler.inverse_value(next));
        }
        Ok(forecasts)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
