//! Combine the per-model metrics and export the comparison tables

use anyhow::{Context, Result};
use clap::Parser;
use stock_forecast::aggregation::aggregate_metrics;
use stock_forecast::cli::{init_tracing, StageArgs};
use stock_forecast::report::export_comparisons;

fn main() -> Result<()> {
    init_tracing()?;
    let config = StageArgs::parse().load_config()?;

    let sources: Vec<_> = config
        .model_outputs()
        .into_iter()
        .map(|(model, _, metrics_file)| (model, metrics_file))
        .collect();
    let combined_file = config.combined_metrics_file();

    let combined = aggregate_metrics(&sources, &combined_file)
        .with_context(|| format!("failed to write {}", combined_file.display()))?;
    println!("\nCombined Evaluation Metrics:\n");
    for record in &combined {
        println!(
            "{:<16} {:<7} MAE {:>12.4} RMSE {:>12.4} MAPE {:>9.4}",
            record.stock, record.model, record.mae, record.rmse, record.mape
        );
    }

    let report = export_comparisons(&combined_file, &config.plots_dir())
        .with_context(|| format!("failed to read {}", combined_file.display()))?;
    for failure in &report.failures {
        eprintln!("{} comparison not exported: {}", failure.item, failure.error);
    }
    Ok(())
}
