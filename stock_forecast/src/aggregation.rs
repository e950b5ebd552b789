//! Aggregation stage: merge the per-model metrics tables into one table

use crate::data::write_rows;
use crate::error::Result;
use crate::evaluation::read_metrics;
use crate::metrics::{CombinedRecord, MetricRecord, Model};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Header of the combined metrics table
pub const COMBINED_HEADER: [&str; 5] = ["Stock", "MAE", "RMSE", "MAPE", "Model"];

const STOCK_SUFFIXES: [&str; 3] = [
    ".NS_lstm_predictions",
    ".NS_hybrid_predictions",
    ".NS_arima_predictions",
];

/// Reduce a producer's stock name to the bare ticker,
/// e.g. `TCS.NS_lstm_predictions` becomes `TCS`
pub fn clean_stock_name(stock: &str) -> String {
    STOCK_SUFFIXES
        .iter()
        .fold(stock.to_string(), |name, suffix| name.replace(suffix, ""))
}

/// Tag metric rows with their model and normalize the stock names
pub fn tag_records(records: Vec<MetricRecord>, model: Model) -> Vec<CombinedRecord> {
    records
        .into_iter()
        .map(|r| CombinedRecord {
            stock: clean_stock_name(&r.stock),
            mae: r.mae,
            rmse: r.rmse,
            mape: r.mape,
            model,
        })
        .collect()
}

/// Load one model's metrics table. A table that cannot be read contributes no
/// rows and is logged.
pub fn load_model_metrics(path: &Path, model: Model) -> Vec<CombinedRecord> {
    match read_metrics(path) {
        Ok(records) => tag_records(records, model),
        Err(error) => {
            warn!(
                model = %model,
                %error,
                "Error loading metrics from {}",
                path.display()
            );
            Vec::new()
        }
    }
}

/// Concatenate the metrics tables of all models, in the order given
pub fn combine_metrics(sources: &[(Model, PathBuf)]) -> Vec<CombinedRecord> {
    sources
        .iter()
        .flat_map(|(model, path)| load_model_metrics(path, *model))
        .collect()
}

/// Combine the per-model tables and persist the result
pub fn aggregate_metrics(sources: &[(Model, PathBuf)], combined_file: &Path) -> Result<Vec<CombinedRecord>> {
    let combined = combine_metrics(sources);
    write_combined(combined_file, &combined)?;
    info!(
        "Combined evaluation metrics saved to {} ({} rows)",
        combined_file.display(),
        combined.len()
    );
    Ok(combined)
}

/// Write a `Stock,MAE,RMSE,MAPE,Model` table
pub fn write_combined(path: &Path, records: &[CombinedRecord]) -> Result<()> {
    write_rows(path, &COMBINED_HEADER, records)
}

/// Read a `Stock,MAE,RMSE,MAPE,Model` table
pub fn read_combined(path: &Path) -> Result<Vec<CombinedRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in rdr.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_stock_name() {
        assert_eq!(clean_stock_name("TCS.NS_lstm_predictions"), "TCS");
        assert_eq!(clean_stock_name("M&M.NS_hybrid_predictions"), "M&M");
        assert_eq!(clean_stock_name("LT.NS_arima_predictions"), "LT");
        assert_eq!(clean_stock_name("X"), "X");
        assert_eq!(clean_stock_name("AAPL_lstm_predictions"), "AAPL_lstm_predictions");
    }

    #[test]
    fn test_missing_table_contributes_nothing() {
        let rows = load_model_metrics(Path::new("/nonexistent/metrics.csv"), Model::Lstm);
        assert!(rows.is_empty());
    }
}
