//! Catalog of the ticker universe: sector, market metadata and the span of
//! clean data per ticker, smallest market capitalisation first

use crate::data::{write_rows, PriceSeries};
use crate::error::Result;
use crate::ingest::TickerMetadata;
use crate::universe::TickerInfo;
use serde::Serialize;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{info, warn};

const CATALOG_HEADER: [&str; 13] = [
    "Serial Number",
    "Ticker",
    "Name",
    "Sector",
    "Market Cap",
    "Volume",
    "Previous Close",
    "PE Ratio",
    "Dividend Yield",
    "Rows",
    "Data Available From",
    "Data Available To",
    "Last Close",
];

const NOT_AVAILABLE: &str = "N/A";

/// One catalog row. Tickers without clean data carry `N/A` dates and no close;
/// metadata the source did not report is left empty, the name reads `N/A`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub serial_number: usize,
    pub ticker: String,
    pub name: String,
    pub sector: String,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub previous_close: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub rows: usize,
    pub data_from: String,
    pub data_to: String,
    pub last_close: Option<f64>,
}

fn entry(
    serial_number: usize,
    info: &TickerInfo,
    meta: Option<&TickerMetadata>,
    series: Option<&PriceSeries>,
) -> CatalogEntry {
    let bars = series.map(|s| s.bars()).unwrap_or_default();
    let date = |bar: Option<&crate::data::PriceBar>| {
        bar.map(|b| b.date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    CatalogEntry {
        serial_number,
        ticker: info.ticker.clone(),
        name: meta
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        sector: info.sector.clone(),
        market_cap: meta.and_then(|m| m.market_cap),
        volume: meta.and_then(|m| m.volume),
        previous_close: meta.and_then(|m| m.previous_close),
        pe_ratio: meta.and_then(|m| m.pe_ratio),
        dividend_yield: meta.and_then(|m| m.dividend_yield),
        rows: bars.len(),
        data_from: date(bars.first()),
        data_to: date(bars.last()),
        last_close: bars.last().map(|b| b.close),
    }
}

/// Ascending market capitalisation; a missing or non-finite cap sorts last
fn by_market_cap(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    let cap = |e: &CatalogEntry| e.market_cap.filter(|v| v.is_finite());
    match (cap(a), cap(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Describe each ticker of the universe from its table in `clean_dir` and its
/// entry in `metadata`.
///
/// Serial numbers follow universe order; the entries come back sorted by
/// market capitalisation, ties keeping universe order.
pub fn build_catalog(universe: &[TickerInfo], clean_dir: &Path, metadata: &[TickerMetadata]) -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> = universe
        .iter()
        .enumerate()
        .map(|(i, info)| {
            let path = clean_dir.join(format!("{}.csv", info.ticker));
            let series = if path.is_file() {
                match PriceSeries::from_csv(&path) {
                    Ok(series) => Some(series),
                    Err(error) => {
                        warn!(ticker = %info.ticker, %error, "unreadable clean table");
                        None
                    }
                }
            } else {
                None
            };
            let meta = metadata.iter().find(|m| m.ticker == info.ticker);
            entry(i + 1, info, meta, series.as_ref())
        })
        .collect();

    entries.sort_by(by_market_cap);
    entries
}

pub fn write_catalog(path: &Path, entries: &[CatalogEntry]) -> Result<()> {
    write_rows(path, &CATALOG_HEADER, entries)?;
    info!("Catalog of {} tickers saved as {}", entries.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn meta(ticker: &str, market_cap: Option<f64>) -> TickerMetadata {
        TickerMetadata {
            name: Some(format!("{} Ltd", ticker.trim_end_matches(".NS"))),
            market_cap,
            ..TickerMetadata::unknown(ticker)
        }
    }

    #[test]
    fn test_catalog_marks_missing_data() {
        let clean = tempdir().unwrap();
        fs::write(
            clean.path().join("TCS.NS.csv"),
            "Date,Open,High,Low,Close,Volume\n2020-01-01,1,1,1,10,5\n2020-01-02,1,1,1,12,5\n",
        )
        .unwrap();
        let universe = vec![
            TickerInfo::new("TCS.NS", "Information Technology"),
            TickerInfo::new("ZEEL.NS", "Media"),
        ];

        let entries = build_catalog(&universe, clean.path(), &[]);
        assert_eq!(entries[0].serial_number, 1);
        assert_eq!(entries[0].rows, 2);
        assert_eq!(entries[0].data_from, "2020-01-01");
        assert_eq!(entries[0].data_to, "2020-01-02");
        assert_eq!(entries[0].last_close, Some(12.0));

        assert_eq!(entries[1].name, "N/A");
        assert_eq!(entries[1].data_from, "N/A");
        assert_eq!(entries[1].last_close, None);

        let out = clean.path().join("catalog.csv");
        write_catalog(&out, &entries).unwrap();
        let text = fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("Serial Number,Ticker,Name,Sector,Market Cap,"));
        assert!(text.ends_with("2,ZEEL.NS,N/A,Media,,,,,,0,N/A,N/A,\n"));
    }

    #[test]
    fn test_catalog_sorted_by_market_cap_missing_last() {
        let clean = tempdir().unwrap();
        let universe = vec![
            TickerInfo::new("RELIANCE.NS", "Energy"),
            TickerInfo::new("ZEEL.NS", "Media"),
            TickerInfo::new("UPL.NS", "Chemicals"),
            TickerInfo::new("MARICO.NS", "Consumer Goods"),
        ];
        let metadata = vec![
            meta("RELIANCE.NS", Some(2.0e13)),
            meta("ZEEL.NS", None),
            meta("UPL.NS", Some(4.0e11)),
            meta("MARICO.NS", Some(f64::NAN)),
        ];

        let entries = build_catalog(&universe, clean.path(), &metadata);
        let order: Vec<(&str, usize)> = entries
            .iter()
            .map(|e| (e.ticker.as_str(), e.serial_number))
            .collect();
        assert_eq!(
            order,
            vec![("UPL.NS", 3), ("RELIANCE.NS", 1), ("ZEEL.NS", 2), ("MARICO.NS", 4)]
        );
        assert_eq!(entries[0].name, "UPL Ltd");
        assert_eq!(entries[0].market_cap, Some(4.0e11));
    }
}
