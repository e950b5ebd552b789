//! Table types shared by the stages and their CSV representation
//!
//! Tables are read through polars and written through the csv crate. Every
//! write goes to a temporary file in the destination directory which is then
//! renamed over the target, so readers never see a partial table.

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Columns a price table must carry
pub const REQUIRED_PRICE_COLUMNS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
}

/// Cleaned daily price history of one ticker: ascending dates, no duplicates
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Create a series, checking that dates strictly increase
    pub fn new(ticker: &str, bars: Vec<PriceBar>) -> Result<Self> {
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::DataError(format!(
                "Dates of {} are not strictly increasing at {}",
                ticker, pair[1].date
            )));
        }
        Ok(Self {
            ticker: ticker.to_string(),
            bars,
        })
    }

    /// Load a cleaned price table
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let df = read_frame(path)?;

        let dates = date_column(&df, "Date")?;
        let open = numeric_column(&df, "Open")?;
        let high = numeric_column(&df, "High")?;
        let low = numeric_column(&df, "Low")?;
        let close = numeric_column(&df, "Close")?;
        let volume = numeric_column(&df, "Volume")?;

        let bars = (0..df.height())
            .map(|i| PriceBar {
                date: dates[i],
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
                volume: volume[i],
            })
            .collect();

        Self::new(&ticker_from_path(path), bars)
    }

    /// Write the series as a `Date,Open,High,Low,Close,Volume` table
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_rows(path.as_ref(), &REQUIRED_PRICE_COLUMNS, &self.bars)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Dates in ascending order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

/// Which column of a prediction table holds the forecast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PredictionColumn {
    /// `Predicted`, written by single-model producers
    Single,
    /// `Hybrid_Predicted`, written by the blended producer
    Hybrid,
}

impl PredictionColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            PredictionColumn::Single => "Predicted",
            PredictionColumn::Hybrid => "Hybrid_Predicted",
        }
    }

    /// Pick the prediction column from a header, preferring `Predicted`
    pub fn resolve<S: AsRef<str>>(columns: &[S]) -> Option<Self> {
        let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);
        if has("Predicted") {
            Some(PredictionColumn::Single)
        } else if has("Hybrid_Predicted") {
            Some(PredictionColumn::Hybrid)
        } else {
            None
        }
    }
}

/// Actual and predicted values read back from a prediction table
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSeries {
    pub column: PredictionColumn,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

impl PredictionSeries {
    /// Load the `Actual` column and the resolved prediction column of a table.
    ///
    /// A table without a prediction column fails with
    /// [`ForecastError::NoPredictionColumn`]; a missing `Actual` column or a
    /// missing or non-numeric cell is a data error.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let df = read_frame(path)?;

        let column = PredictionColumn::resolve(&df.get_column_names()).ok_or_else(|| {
            ForecastError::NoPredictionColumn(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string()),
            )
        })?;

        let actual = numeric_column(&df, "Actual")?;
        let predicted = numeric_column(&df, column.column_name())?;

        Ok(Self {
            column,
            actual,
            predicted,
        })
    }
}

/// One row of a prediction table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRow {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

/// A producer's output for one ticker: `Date,Actual,<prediction column>`
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionTable {
    column: PredictionColumn,
    rows: Vec<PredictionRow>,
}

impl PredictionTable {
    /// Build a table from position-aligned columns
    pub fn new(
        column: PredictionColumn,
        dates: &[NaiveDate],
        actual: &[f64],
        predicted: &[f64],
    ) -> Result<Self> {
        if actual.len() != predicted.len() {
            return Err(ForecastError::ShapeMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }
        if dates.len() != actual.len() {
            return Err(ForecastError::DataError(format!(
                "{} dates for {} values",
                dates.len(),
                actual.len()
            )));
        }

        let rows = dates
            .iter()
            .zip(actual.iter().zip(predicted))
            .map(|(&date, (&actual, &predicted))| PredictionRow {
                date,
                actual,
                predicted,
            })
            .collect();

        Ok(Self { column, rows })
    }

    pub fn column(&self) -> PredictionColumn {
        self.column
    }

    pub fn rows(&self) -> &[PredictionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the table atomically
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_atomic(path.as_ref(), |out| {
            let mut wtr = csv::Writer::from_writer(out);
            wtr.write_record(["Date", "Actual", self.column.column_name()])?;
            for row in &self.rows {
                wtr.write_record(&[
                    row.date.format("%Y-%m-%d").to_string(),
                    row.actual.to_string(),
                    row.predicted.to_string(),
                ])?;
            }
            wtr.flush()?;
            Ok(())
        })
    }
}

/// Read a CSV file with a header row into a DataFrame
pub fn read_frame(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    let df = CsvReader::new(file)
        .infer_schema(None)
        .has_header(true)
        .finish()?;
    Ok(df)
}

/// Extract a column as `f64`, failing on missing or non-numeric cells
pub fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)
        .map_err(|_| ForecastError::MissingColumn(name.to_string()))?;
    let casted = series.cast(&DataType::Float64)?;
    let values = casted.f64()?;

    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Column '{}' has a missing or non-numeric value at row {}",
                    name,
                    i + 1
                ))
            })
        })
        .collect()
}

/// Extract a column as optional strings, one per row
pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df
        .column(name)
        .map_err(|_| ForecastError::MissingColumn(name.to_string()))?;
    let casted = series.cast(&DataType::Utf8)?;
    let values = casted.utf8()?;
    Ok(values.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Extract a column of dates, failing on any unparsable cell
pub fn date_column(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    text_column(df, name)?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_deref().and_then(parse_date).ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Column '{}' has an invalid date at row {}",
                    name,
                    i + 1
                ))
            })
        })
        .collect()
}

/// Parse a calendar date, accepting a trailing time or timezone part
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    // "2015-01-02 00:00:00+05:30", "2015-01-02T00:00:00Z"
    text.get(..10)
        .filter(|_| matches!(text.as_bytes().get(10), Some(b' ') | Some(b'T')))
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Ticker or stock name of a table: the file name without its `.csv` extension
pub fn ticker_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(".csv") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// Write `path` through a temporary sibling file that is renamed into place
pub fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    write(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Serialize rows under an explicit header, atomically.
///
/// The header is written even when there are no rows.
pub fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<()> {
    write_atomic(path, |out| {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(out);
        wtr.write_record(header)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_date_variants() {
        let expected = NaiveDate::from_ymd_opt(2015, 1, 2);
        assert_eq!(parse_date("2015-01-02"), expected);
        assert_eq!(parse_date(" 2015-01-02 "), expected);
        assert_eq!(parse_date("2015-01-02 00:00:00"), expected);
        assert_eq!(parse_date("2015-01-02 00:00:00+05:30"), expected);
        assert_eq!(parse_date("2015-01-02T00:00:00Z"), expected);
        assert_eq!(parse_date("02/01/2015"), None);
        assert_eq!(parse_date("2015-13-40"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_resolve_prefers_single_column() {
        assert_eq!(
            PredictionColumn::resolve(&["Date", "Actual", "Hybrid_Predicted", "Predicted"]),
            Some(PredictionColumn::Single)
        );
        assert_eq!(
            PredictionColumn::resolve(&["Date", "Actual", "Hybrid_Predicted"]),
            Some(PredictionColumn::Hybrid)
        );
        assert_eq!(PredictionColumn::resolve(&["Date", "Actual"]), None);
    }

    #[test]
    fn test_ticker_from_path() {
        assert_eq!(ticker_from_path(Path::new("dir/TCS.NS.csv")), "TCS.NS");
        assert_eq!(
            ticker_from_path(Path::new("TCS.NS_lstm_predictions.csv")),
            "TCS.NS_lstm_predictions"
        );
        assert_eq!(ticker_from_path(Path::new("notes.txt")), "notes.txt");
    }

    #[test]
    fn test_price_series_rejects_unsorted_dates() {
        let bar = |d: u32| PriceBar {
            date: NaiveDate::from_ymd_opt(2023, 1, d).unwrap(),
            open: 1.0,
            high: 1.0,
            low: 1.0,
            close: 1.0,
            volume: 1.0,
        };
        assert!(PriceSeries::new("X", vec![bar(1), bar(2)]).is_ok());
        assert!(PriceSeries::new("X", vec![bar(2), bar(1)]).is_err());
        assert!(PriceSeries::new("X", vec![bar(1), bar(1)]).is_err());
    }

    #[test]
    fn test_prediction_table_write_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("AAA_hybrid_predictions.csv");
        let dates: Vec<NaiveDate> = (1..=3)
            .map(|d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap())
            .collect();

        let table = PredictionTable::new(
            PredictionColumn::Hybrid,
            &dates,
            &[1.0, 2.0, 3.0],
            &[1.5, 2.0, 2.5],
        )
        .unwrap();
        table.write_csv(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Date,Actual,Hybrid_Predicted\n2023-01-01,1,1.5\n"));

        let loaded = PredictionSeries::from_csv(&path).unwrap();
        assert_eq!(loaded.column, PredictionColumn::Hybrid);
        assert_eq!(loaded.actual, vec![1.0, 2.0, 3.0]);
        assert_eq!(loaded.predicted, vec![1.5, 2.0, 2.5]);
    }

    #[test]
    fn test_prediction_table_shape_mismatch() {
        let dates = [NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()];
        let result = PredictionTable::new(PredictionColumn::Single, &dates, &[1.0], &[1.0, 2.0]);
        assert!(matches!(
            result,
            Err(ForecastError::ShapeMismatch { actual: 1, predicted: 2 })
        ));
    }

    #[test]
    fn test_write_atomic_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "old contents that are longer").unwrap();

        write_atomic(&path, |out| {
            out.write_all(b"new")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        // Only the target remains; the temporary file was renamed
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
