//! Copy the curated selection out of the clean price tables

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::selection::select_stocks;

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;

    select_stocks(&config.dirs.clean, &config.dirs.selected, &config.selection)
        .with_context(|| format!("selection from {} failed", config.dirs.clean.display()))?;
    Ok(())
}
