//! Cleaning stage: raw download tables in, ordered price tables out

use crate::batch::{ensure_input_dir, ensure_output_dir, item_name, list_csv_files, BatchReport};
use crate::data::{parse_date, read_frame, text_column, PriceBar, PriceSeries, REQUIRED_PRICE_COLUMNS};
use crate::error::{ForecastError, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What cleaning one file did
#[derive(Debug, Clone, PartialEq)]
pub struct CleanSummary {
    pub path: PathBuf,
    pub raw_rows: usize,
    pub kept_rows: usize,
}

/// Numeric column with unparsable cells read as missing
fn lenient_numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df
        .column(name)
        .map_err(|_| ForecastError::MissingColumn(name.to_string()))?;
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted.f64()?.into_iter().collect())
}

/// Turn a raw table into a price series.
///
/// Rows with a missing value in any column are dropped, then rows whose date
/// does not parse. The rest is sorted by date, keeping the first row of each date.
pub fn clean_frame(ticker: &str, df: &DataFrame) -> Result<PriceSeries> {
    let columns = df.get_column_names();
    let missing: Vec<&str> = REQUIRED_PRICE_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.contains(c))
        .collect();
    if !missing.is_empty() {
        return Err(ForecastError::MissingColumn(format!(
            "required columns absent: {}",
            missing.join(", ")
        )));
    }

    let df = df.drop_nulls::<String>(None)?;

    let dates = text_column(&df, "Date")?;
    let open = lenient_numeric_column(&df, "Open")?;
    let high = lenient_numeric_column(&df, "High")?;
    let low = lenient_numeric_column(&df, "Low")?;
    let close = lenient_numeric_column(&df, "Close")?;
    let volume = lenient_numeric_column(&df, "Volume")?;

    let mut bars: Vec<PriceBar> = (0..df.height())
        .filter_map(|i| {
            Some(PriceBar {
                date: dates[i].as_deref().and_then(parse_date)?,
                open: open[i]?,
                high: high[i]?,
                low: low[i]?,
                close: close[i]?,
                volume: volume[i]?,
            })
        })
        .collect();

    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    PriceSeries::new(ticker, bars)
}

/// Clean one raw table into `clean_dir`, under the same file name
pub fn clean_file(raw: &Path, clean_dir: &Path) -> Result<CleanSummary> {
    let df = read_frame(raw)?;
    let raw_rows = df.height();
    let ticker = crate::data::ticker_from_path(raw);

    let series = clean_frame(&ticker, &df)?;
    if series.is_empty() {
        return Err(ForecastError::EmptySeries(format!(
            "{} has no complete rows",
            item_name(raw)
        )));
    }

    let path = clean_dir.join(item_name(raw));
    series.write_csv(&path)?;
    debug!(ticker = %ticker, raw_rows, kept_rows = series.len(), "cleaned");
    info!("Cleaned data for {} saved to {}", item_name(raw), path.display());

    Ok(CleanSummary {
        path,
        raw_rows,
        kept_rows: series.len(),
    })
}

/// Clean every raw table in `raw_dir`
pub fn clean_all(raw_dir: &Path, clean_dir: &Path) -> Result<BatchReport<CleanSummary>> {
    ensure_input_dir(raw_dir)?;
    ensure_output_dir(clean_dir)?;

    let mut report = BatchReport::new();
    for path in list_csv_files(raw_dir)? {
        report.record(&item_name(&path), clean_file(&path, clean_dir));
    }
    report.log_summary("clean");
    Ok(report)
}
