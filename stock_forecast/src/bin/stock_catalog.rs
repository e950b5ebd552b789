//! Write the ticker catalog: name, sector, market metadata and data range of
//! every ticker, smallest market capitalisation first

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::batch::ensure_input_dir;
use stock_forecast::catalog::{build_catalog, write_catalog};
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::ingest::{fetch_metadata, YahooSource};
use tracing::info;

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;
    ensure_input_dir(&config.dirs.clean)?;

    let source = YahooSource::new().context("failed to build HTTP client")?;
    let tickers: Vec<String> = config.universe.iter().map(|t| t.ticker.clone()).collect();
    let metadata = fetch_metadata(&source, &tickers);
    info!("Metadata found for {} of {} tickers", metadata.outputs.len(), tickers.len());

    let entries = build_catalog(&config.universe, &config.dirs.clean, &metadata.outputs);
    write_catalog(&config.catalog_file, &entries)
        .with_context(|| format!("failed to write {}", config.catalog_file.display()))?;
    Ok(())
}
