//! Forecast producer stages: selected price tables in, prediction tables out

use crate::batch::{ensure_input_dir, ensure_output_dir, item_name, list_csv_files, BatchReport};
use crate::data::{PredictionColumn, PredictionTable, PriceSeries};
use crate::error::Result;
use crate::metrics::Model;
use crate::models::{
    ArimaModel, ArimaOrder, FittedHybrid, FittedModel, ForecastModel, LstmConfig, LstmModel,
};
use crate::plots::line_chart;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prediction table of a fitted model against the close series it was fitted on
pub fn prediction_table<M: FittedModel>(
    series: &PriceSeries,
    fitted: &M,
    column: PredictionColumn,
) -> Result<PredictionTable> {
    let start = fitted.warmup().min(series.len());
    let dates = series.dates();
    let closes = series.closes();
    PredictionTable::new(column, &dates[start..], &closes[start..], fitted.fitted_values())
}

/// Output path of a producer: `<dir>/<ticker><model suffix>.csv`
pub fn prediction_path(dir: &Path, ticker: &str, model: Model) -> PathBuf {
    dir.join(format!("{}{}.csv", ticker, model.file_suffix()))
}

fn produce_arima(path: &Path, arima_dir: &Path, model: &ArimaModel) -> Result<PathBuf> {
    let series = PriceSeries::from_csv(path)?;
    let fitted = model.fit(&series.closes())?;
    let table = prediction_table(&series, &fitted, PredictionColumn::Single)?;

    let out = prediction_path(arima_dir, series.ticker(), Model::Arima);
    table.write_csv(&out)?;
    plot_predictions(&table, &arima_dir.join(format!("{}_arima_plot.png", series.ticker())), series.ticker())?;
    info!("ARIMA results saved for {}", series.ticker());
    Ok(out)
}

fn plot_predictions(table: &PredictionTable, path: &Path, ticker: &str) -> Result<()> {
    let rows = table.rows();
    let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
    let actual = rows.iter().map(|r| Some(r.actual)).collect();
    let predicted = rows.iter().map(|r| Some(r.predicted)).collect();
    line_chart(
        path,
        &format!("ARIMA Prediction for {}", ticker),
        "Close Price",
        &dates,
        &[("Actual", actual), ("Predicted", predicted)],
    )
}

/// Fit ARIMA on every selected price table and write its in-sample predictions
pub fn run_arima(selected_dir: &Path, arima_dir: &Path, order: ArimaOrder) -> Result<BatchReport<PathBuf>> {
    ensure_input_dir(selected_dir)?;
    ensure_output_dir(arima_dir)?;
    let model = ArimaModel::new(order)?;

    let mut report = BatchReport::new();
    for path in list_csv_files(selected_dir)? {
        report.record(&item_name(&path), produce_arima(&path, arima_dir, &model));
    }
    report.log_summary("arima");
    Ok(report)
}

/// Settings of the LSTM and hybrid producer
#[derive(Debug, Clone)]
pub struct HybridSettings {
    pub arima: ArimaOrder,
    pub lstm: LstmConfig,
    /// Weight of the ARIMA series in the blend
    pub weight: f64,
}

/// Files written for one ticker by the LSTM and hybrid producer
#[derive(Debug, Clone, PartialEq)]
pub struct HybridOutputs {
    pub lstm: PathBuf,
    pub hybrid: PathBuf,
}

fn produce_lstm_hybrid(
    path: &Path,
    lstm_dir: &Path,
    hybrid_dir: &Path,
    arima: &ArimaModel,
    lstm: &LstmModel,
    weight: f64,
) -> Result<HybridOutputs> {
    let series = PriceSeries::from_csv(path)?;
    let ticker = series.ticker();
    let closes = series.closes();

    let lstm_fit = lstm.fit(&closes)?;
    let lstm_table = prediction_table(&series, &lstm_fit, PredictionColumn::Single)?;
    let lstm_out = prediction_path(lstm_dir, ticker, Model::Lstm);
    lstm_table.write_csv(&lstm_out)?;
    info!("LSTM results saved for {}", ticker);

    let arima_fit = arima.fit(&closes)?;
    let hybrid_fit = FittedHybrid::from_parts(arima_fit, lstm_fit, weight)?;
    let hybrid_table = prediction_table(&series, &hybrid_fit, PredictionColumn::Hybrid)?;
    let hybrid_out = prediction_path(hybrid_dir, ticker, Model::Hybrid);
    hybrid_table.write_csv(&hybrid_out)?;
    info!("Hybrid model results saved for {}", ticker);

    Ok(HybridOutputs {
        lstm: lstm_out,
        hybrid: hybrid_out,
    })
}

/// Fit the LSTM on every selected price table, then blend it with ARIMA.
///
/// Both fits are reused for the hybrid, so each model is trained once per ticker.
pub fn run_lstm_hybrid(
    selected_dir: &Path,
    lstm_dir: &Path,
    hybrid_dir: &Path,
    settings: &HybridSettings,
) -> Result<BatchReport<HybridOutputs>> {
    ensure_input_dir(selected_dir)?;
    ensure_output_dir(lstm_dir)?;
    ensure_output_dir(hybrid_dir)?;
    let arima = ArimaModel::new(settings.arima)?;
    let lstm = LstmModel::new(settings.lstm.clone())?;

    let mut report = BatchReport::new();
    for path in list_csv_files(selected_dir)? {
        let outcome = produce_lstm_hybrid(&path, lstm_dir, hybrid_dir, &arima, &lstm, settings.weight);
        report.record(&item_name(&path), outcome);
    }
    report.log_summary("lstm_hybrid");
    Ok(report)
}
