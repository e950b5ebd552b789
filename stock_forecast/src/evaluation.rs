//! Evaluation stage: prediction tables in, one metrics table out

use crate::batch::{ensure_input_dir, ensure_output_dir, item_name, list_csv_files, BatchReport};
use crate::data::{ticker_from_path, write_rows, PredictionSeries};
use crate::error::Result;
use crate::metrics::{evaluate_model, MetricRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Header of a per-model metrics table
pub const METRICS_HEADER: [&str; 4] = ["Stock", "MAE", "RMSE", "MAPE"];

/// Compute the metric record of one prediction table
pub fn evaluate_file(path: &Path) -> Result<MetricRecord> {
    let stock = ticker_from_path(path);
    let series = PredictionSeries::from_csv(path)?;
    debug!(
        stock = %stock,
        column = series.column.column_name(),
        rows = series.actual.len(),
        "loaded prediction table"
    );

    let metrics = evaluate_model(&series.actual, &series.predicted)?;
    Ok(MetricRecord::new(&stock, metrics))
}

/// Evaluate each file on its own. Failures are recorded and skipped.
pub fn evaluate_files(files: &[PathBuf]) -> BatchReport<MetricRecord> {
    let mut report = BatchReport::new();
    for path in files {
        report.record(&item_name(path), evaluate_file(path));
    }
    report
}

/// Evaluate every prediction table in `results_dir` and write the metrics to
/// `evaluation_file`.
///
/// The metrics table is always rewritten, with only its header when no file
/// could be evaluated. A missing `results_dir` fails before anything is written.
pub fn evaluate_results(results_dir: &Path, evaluation_file: &Path) -> Result<BatchReport<MetricRecord>> {
    ensure_input_dir(results_dir)?;
    if let Some(parent) = evaluation_file.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_output_dir(parent)?;
        }
    }

    let files = list_csv_files(results_dir)?;
    let report = evaluate_files(&files);

    write_metrics(evaluation_file, &report.outputs)?;
    info!(
        "Evaluation results saved to {} ({} stocks)",
        evaluation_file.display(),
        report.outputs.len()
    );
    report.log_summary("evaluate");

    Ok(report)
}

/// Write a `Stock,MAE,RMSE,MAPE` table
pub fn write_metrics(path: &Path, records: &[MetricRecord]) -> Result<()> {
    write_rows(path, &METRICS_HEADER, records)
}

/// Read a `Stock,MAE,RMSE,MAPE` table. Non-finite values read back as written.
pub fn read_metrics(path: &Path) -> Result<Vec<MetricRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}
