//! Rolling means and ARIMA fit summaries of the selected tickers

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::eda::run_eda;

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;

    run_eda(&config.dirs.selected, &config.dirs.eda, config.arima, config.rolling_window)
        .with_context(|| format!("analysis of {} failed", config.dirs.selected.display()))?;
    Ok(())
}
