//! Exploratory analysis of the selected price tables
//!
//! For each ticker: the close series with its trailing rolling mean, charts
//! of both, and a text summary of an ARIMA fit.

use crate::batch::{ensure_input_dir, ensure_output_dir, item_name, list_csv_files, BatchReport};
use crate::data::{write_atomic, write_rows, PriceSeries};
use crate::error::Result;
use crate::models::{ArimaModel, ArimaOrder, ForecastModel};
use crate::plots::line_chart;
use chrono::NaiveDate;
use forecast_math::stats::rolling_mean;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

const ROLLING_HEADER: [&str; 3] = ["Date", "Close", "Rolling_Mean"];

/// One row of a rolling mean table. `rolling_mean` is empty until the window fills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingMeanRow {
    pub date: NaiveDate,
    pub close: f64,
    pub rolling_mean: Option<f64>,
}

pub fn rolling_mean_rows(series: &PriceSeries, window: usize) -> Vec<RollingMeanRow> {
    let closes = series.closes();
    let means = rolling_mean(&closes, window);
    series
        .bars()
        .iter()
        .zip(means)
        .map(|(bar, rolling_mean)| RollingMeanRow {
            date: bar.date,
            close: bar.close,
            rolling_mean,
        })
        .collect()
}

/// Files written for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct EdaOutputs {
    pub rolling_mean: PathBuf,
    pub trend_plot: PathBuf,
    pub rolling_plot: PathBuf,
    pub arima_summary: PathBuf,
}

fn analyse_file(path: &Path, eda_dir: &Path, model: &ArimaModel, window: usize) -> Result<EdaOutputs> {
    let series = PriceSeries::from_csv(path)?;
    let ticker = series.ticker();

    let rolling_path = eda_dir.join(format!("{}_rolling_mean.csv", ticker));
    let rows = rolling_mean_rows(&series, window);
    write_rows(&rolling_path, &ROLLING_HEADER, &rows)?;

    let dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
    let closes: Vec<Option<f64>> = rows.iter().map(|r| Some(r.close)).collect();
    let means: Vec<Option<f64>> = rows.iter().map(|r| r.rolling_mean).collect();

    let trend_plot = eda_dir.join(format!("{}_trend.png", ticker));
    line_chart(
        &trend_plot,
        &format!("Closing Price Trend for {}", ticker),
        "Close Price",
        &dates,
        &[("Close Price", closes.clone())],
    )?;

    let rolling_plot = eda_dir.join(format!("{}_rolling_mean.png", ticker));
    let mean_label = format!("{}-Day Rolling Mean", window);
    line_chart(
        &rolling_plot,
        &format!("Rolling Mean for {}", ticker),
        "Price",
        &dates,
        &[("Close Price", closes), (mean_label.as_str(), means)],
    )?;

    let fitted = model.fit(&series.closes())?;
    let summary = fitted.summary(ticker);
    let summary_path = eda_dir.join(format!("{}_arima_summary.txt", ticker));
    write_atomic(&summary_path, |out| {
        out.write_all(summary.as_bytes())?;
        Ok(())
    })?;

    info!("EDA results saved for {}", ticker);
    Ok(EdaOutputs {
        rolling_mean: rolling_path,
        trend_plot,
        rolling_plot,
        arima_summary: summary_path,
    })
}

/// Run the analysis over every price table in `selected_dir`
pub fn run_eda(
    selected_dir: &Path,
    eda_dir: &Path,
    order: ArimaOrder,
    window: usize,
) -> Result<BatchReport<EdaOutputs>> {
    ensure_input_dir(selected_dir)?;
    ensure_output_dir(eda_dir)?;
    let model = ArimaModel::new(order)?;

    let mut report = BatchReport::new();
    for path in list_csv_files(selected_dir)? {
        report.record(&item_name(&path), analyse_file(&path, eda_dir, &model, window));
    }
    report.log_summary("eda");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::PriceBar;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_rolling_mean_rows() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let bars = (0..4)
            .map(|i| PriceBar {
                date: start + chrono::Duration::days(i),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: (i + 1) as f64,
                volume: 100.0,
            })
            .collect();
        let series = PriceSeries::new("X", bars).unwrap();

        let rows = rolling_mean_rows(&series, 3);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].rolling_mean, None);
        assert_eq!(rows[2].rolling_mean, Some(2.0));
        assert_eq!(rows[3].rolling_mean, Some(3.0));
    }

    #[test]
    fn test_run_eda_writes_tables_and_charts() {
        let selected = tempdir().unwrap();
        let eda = tempdir().unwrap();
        let mut table = String::from("Date,Open,High,Low,Close,Volume\n");
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        for i in 0..40 {
            let close = 200.0 + (i as f64 * 0.4).sin() * 5.0 + i as f64 * 0.3;
            table.push_str(&format!(
                "{},{c},{c},{c},{c},1000\n",
                start + chrono::Duration::days(i),
                c = close
            ));
        }
        fs::write(selected.path().join("INFY.NS.csv"), table).unwrap();

        let report = run_eda(selected.path(), eda.path(), ArimaOrder::default(), 10).unwrap();
        assert!(report.failures.is_empty());
        let outputs = &report.outputs[0];
        assert_eq!(outputs.trend_plot, eda.path().join("INFY.NS_trend.png"));
        assert_eq!(outputs.rolling_plot, eda.path().join("INFY.NS_rolling_mean.png"));
        for path in [&outputs.rolling_mean, &outputs.trend_plot, &outputs.rolling_plot, &outputs.arima_summary] {
            assert!(path.is_file(), "{} missing", path.display());
        }
        assert!(fs::read(&outputs.trend_plot).unwrap().starts_with(b"\x89PNG"));
    }
}
