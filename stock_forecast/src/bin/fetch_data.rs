//! Download daily price history for the ticker universe

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::ingest::{download_all, YahooSource};
use tracing::info;

fn main() -> Result<()> {
    init_tracing()?;
    let args = StageArgs::parse();
    let config = args.load_config()?;

    let source = YahooSource::new().context("failed to build HTTP client")?;
    let tickers: Vec<String> = config.universe.iter().map(|t| t.ticker.clone()).collect();
    let end = Local::now().date_naive();

    info!("Downloading {} tickers from {} to {}", tickers.len(), config.start_date, end);
    let report = download_all(&source, &tickers, &config.dirs.raw, config.start_date, end)
        .with_context(|| format!("failed to prepare {}", config.dirs.raw.display()))?;

    info!("{} tickers downloaded, {} failed", report.outputs.len(), report.failures.len());
    Ok(())
}
