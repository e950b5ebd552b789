//! Model comparison tables
//!
//! One pivot per metric: a row per stock, a column per model. Each pivot is
//! written as a table and drawn as a grouped bar chart.

use crate::aggregation::read_combined;
use crate::batch::{ensure_output_dir, BatchReport};
use crate::data::write_atomic;
use crate::error::{ForecastError, Result};
use crate::metrics::{CombinedRecord, Metric, Model};
use crate::plots::grouped_bar_chart;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// A metric pivoted by stock and model
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub metric: Metric,
    /// Column order
    pub models: Vec<Model>,
    /// Stocks in ascending order, one value per model column
    pub rows: Vec<(String, Vec<Option<f64>>)>,
}

/// Pivot one metric of the combined table.
///
/// Columns are the models present, in [`Model::ALL`] order. A stock/model pair
/// appearing twice is an error.
pub fn pivot(records: &[CombinedRecord], metric: Metric) -> Result<PivotTable> {
    let models: Vec<Model> = Model::ALL
        .into_iter()
        .filter(|m| records.iter().any(|r| r.model == *m))
        .collect();

    let mut cells: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
    for record in records {
        let column = models.iter().position(|m| *m == record.model).unwrap_or(0);
        let row = cells
            .entry(record.stock.as_str())
            .or_insert_with(|| vec![None; models.len()]);
        if row[column].is_some() {
            return Err(ForecastError::DataError(format!(
                "Duplicate {} entry for stock {}",
                record.model, record.stock
            )));
        }
        row[column] = Some(metric.value(record));
    }

    Ok(PivotTable {
        metric,
        models,
        rows: cells
            .into_iter()
            .map(|(stock, values)| (stock.to_string(), values))
            .collect(),
    })
}

/// Write a pivot as `Stock,<model>...`; missing cells are left empty
pub fn write_pivot(path: &Path, table: &PivotTable) -> Result<()> {
    write_atomic(path, |out| {
        let mut wtr = csv::Writer::from_writer(out);
        let mut header = vec!["Stock"];
        header.extend(table.models.iter().map(|m| m.label()));
        wtr.write_record(&header)?;

        for (stock, values) in &table.rows {
            let mut record = vec![stock.clone()];
            record.extend(values.iter().map(|v| v.map(|x| x.to_string()).unwrap_or_default()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    })
}

/// Files written for one metric
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub metric: Metric,
    pub table: PathBuf,
    pub chart: PathBuf,
}

fn chart_title(metric: Metric) -> &'static str {
    match metric {
        Metric::Mae => "Mean Absolute Error (MAE) Comparison",
        Metric::Rmse => "Root Mean Squared Error (RMSE) Comparison",
        Metric::Mape => "Mean Absolute Percentage Error (MAPE) Comparison",
    }
}

fn export_metric(records: &[CombinedRecord], metric: Metric, plots_dir: &Path) -> Result<Comparison> {
    let table = pivot(records, metric)?;
    let table_path = plots_dir.join(format!("{}_comparison.csv", metric.label()));
    write_pivot(&table_path, &table)?;
    info!("Comparison table saved: {}", table_path.display());

    let stocks: Vec<String> = table.rows.iter().map(|(stock, _)| stock.clone()).collect();
    let series: Vec<(&str, Vec<Option<f64>>)> = table
        .models
        .iter()
        .enumerate()
        .map(|(j, model)| (model.label(), table.rows.iter().map(|(_, values)| values[j]).collect()))
        .collect();
    let chart_path = plots_dir.join(format!("{}_comparison.png", metric.label()));
    grouped_bar_chart(&chart_path, chart_title(metric), metric.label(), &stocks, &series)?;
    info!("Comparison chart saved: {}", chart_path.display());

    Ok(Comparison {
        metric,
        table: table_path,
        chart: chart_path,
    })
}

/// Write `<METRIC>_comparison.csv` and `<METRIC>_comparison.png` for every
/// metric. A metric that cannot be exported is recorded and the rest still are.
pub fn export_records(records: &[CombinedRecord], plots_dir: &Path) -> Result<BatchReport<Comparison>> {
    ensure_output_dir(plots_dir)?;

    let mut report = BatchReport::new();
    for metric in Metric::ALL {
        report.record(metric.label(), export_metric(records, metric, plots_dir));
    }
    report.log_summary("comparisons");
    Ok(report)
}

/// Export the comparisons of the combined metrics table
pub fn export_comparisons(combined_file: &Path, plots_dir: &Path) -> Result<BatchReport<Comparison>> {
    let records = read_combined(combined_file)?;
    export_records(&records, plots_dir)
}
