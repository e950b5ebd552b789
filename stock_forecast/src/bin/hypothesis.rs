//! Welch t-tests between the model groups

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::hypothesis::{format_outcomes, run_hypothesis};

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;
    let combined_file = config.combined_metrics_file();

    let outcomes = run_hypothesis(&combined_file, &config.hypothesis_dir())
        .with_context(|| format!("hypothesis tests on {} failed", combined_file.display()))?;
    print!("{}", format_outcomes(&outcomes));
    Ok(())
}
