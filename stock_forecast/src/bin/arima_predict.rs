//! ARIMA in-sample predictions for the selected tickers

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::producers::run_arima;
use tracing::info;

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;

    info!("Fitting ARIMA{} on {}", config.arima, config.dirs.selected.display());
    run_arima(&config.dirs.selected, &config.dirs.arima, config.arima)
        .with_context(|| format!("ARIMA stage on {} failed", config.dirs.selected.display()))?;
    Ok(())
}
