use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use stock_forecast::aggregation::{aggregate_metrics, read_combined};
use stock_forecast::evaluation::write_metrics;
use stock_forecast::metrics::{MetricRecord, Model};
use tempfile::tempdir;

fn metric(stock: &str, mae: f64) -> MetricRecord {
    MetricRecord {
        stock: stock.to_string(),
        mae,
        rmse: mae * 2.0,
        mape: mae * 10.0,
    }
}

#[test]
fn test_one_row_per_model() {
    let dir = tempdir().unwrap();
    let mut sources: Vec<(Model, PathBuf)> = Vec::new();
    for (model, stock) in [
        (Model::Lstm, "X.NS_lstm_predictions"),
        (Model::Hybrid, "X.NS_hybrid_predictions"),
        (Model::Arima, "X.NS_arima_predictions"),
    ] {
        let path = dir.path().join(format!("{}.csv", model.label()));
        write_metrics(&path, &[metric(stock, 1.0)]).unwrap();
        sources.push((model, path));
    }

    let combined_file = dir.path().join("combined.csv");
    let combined = aggregate_metrics(&sources, &combined_file).unwrap();

    let rows: Vec<_> = combined.iter().filter(|r| r.stock == "X").collect();
    assert_eq!(rows.len(), 3);
    let models: HashSet<Model> = rows.iter().map(|r| r.model).collect();
    assert_eq!(models.len(), 3);

    let text = fs::read_to_string(&combined_file).unwrap();
    assert_eq!(
        text,
        "Stock,MAE,RMSE,MAPE,Model\n\
         X,1.0,2.0,10.0,LSTM\n\
         X,1.0,2.0,10.0,Hybrid\n\
         X,1.0,2.0,10.0,ARIMA\n"
    );
    assert_eq!(read_combined(&combined_file).unwrap(), combined);
}

#[test]
fn test_unreadable_table_contributes_no_rows() {
    let dir = tempdir().unwrap();
    let lstm = dir.path().join("lstm.csv");
    write_metrics(&lstm, &[metric("A.NS_lstm_predictions", 1.0), metric("B.NS_lstm_predictions", 2.0)]).unwrap();

    let sources = vec![
        (Model::Lstm, lstm),
        (Model::Hybrid, dir.path().join("missing.csv")),
    ];
    let combined = aggregate_metrics(&sources, &dir.path().join("combined.csv")).unwrap();

    assert_eq!(combined.len(), 2);
    assert_eq!(combined[0].stock, "A");
    assert_eq!(combined[1].stock, "B");
    assert!(combined.iter().all(|r| r.model == Model::Lstm));
}
