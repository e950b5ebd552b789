//! LSTM and hybrid in-sample predictions for the selected tickers

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::producers::{run_lstm_hybrid, HybridSettings};

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;

    let settings = HybridSettings {
        arima: config.arima,
        lstm: config.lstm.clone(),
        weight: config.hybrid_weight,
    };
    run_lstm_hybrid(&config.dirs.selected, &config.dirs.lstm, &config.dirs.hybrid, &settings)
        .with_context(|| format!("LSTM stage on {} failed", config.dirs.selected.display()))?;
    Ok(())
}
