//! Clean the raw price tables

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::cleaning::clean_all;
use stock_forecast::cli::{init_tracing, StageArgs};

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;

    clean_all(&config.dirs.raw, &config.dirs.clean)
        .with_context(|| format!("cleaning {} failed", config.dirs.raw.display()))?;
    Ok(())
}
