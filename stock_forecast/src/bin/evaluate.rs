//! Score the prediction tables of every model

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::batch::ensure_input_dir;
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::evaluation::evaluate_results;

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;
    let jobs = config.model_outputs();

    for (model, results_dir, _) in &jobs {
        ensure_input_dir(results_dir)
            .with_context(|| format!("no {} predictions to evaluate", model))?;
    }

    for (model, results_dir, metrics_file) in &jobs {
        evaluate_results(results_dir, metrics_file)
            .with_context(|| format!("{} evaluation failed", model))?;
    }
    Ok(())
}
