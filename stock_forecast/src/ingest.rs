//! Daily price download and ticker metadata
//!
//! A [`PriceSource`] returns the raw daily bars and the descriptive metadata
//! of one ticker; [`download_all`] writes one raw table per ticker and
//! [`fetch_metadata`] collects the metadata of a universe. The raw tables keep
//! missing values as empty cells, so cleaning decides what to drop.

use crate::batch::{ensure_output_dir, BatchReport};
use crate::data::write_rows;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use yahoo_finance_api::{Quote, YahooConnector};

/// Header of a raw price table
pub const RAW_HEADER: [&str; 7] = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"];

const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";

/// One day as returned by a source; any value may be missing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

/// Descriptive fields of a ticker. Anything the source does not report is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerMetadata {
    pub ticker: String,
    pub name: Option<String>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub previous_close: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl TickerMetadata {
    /// Metadata with every field missing
    pub fn unknown(ticker: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            ..Self::default()
        }
    }
}

/// Source of daily price history and ticker metadata
pub trait PriceSource {
    /// Daily bars of `ticker` from `start` up to, not including, `end`
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>>;

    /// Name, market capitalisation and quote statistics of `ticker`
    fn metadata(&self, ticker: &str) -> Result<TickerMetadata>;
}

/// Daily bars from quotes.
///
/// NSE daily quotes are stamped at the session open, which falls on the
/// same calendar day in UTC.
pub fn bars_from_quotes(quotes: &[Quote]) -> Result<Vec<RawBar>> {
    quotes
        .iter()
        .map(|q| {
            let date = DateTime::from_timestamp(q.timestamp as i64, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| ForecastError::DataError(format!("Invalid timestamp {}", q.timestamp)))?;
            Ok(RawBar {
                date,
                open: Some(q.open),
                high: Some(q.high),
                low: Some(q.low),
                close: Some(q.close),
                adj_close: Some(q.adjclose),
                volume: Some(q.volume as f64),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    result: Option<Vec<SummaryModules>>,
    error: Option<SummaryError>,
}

#[derive(Debug, Deserialize)]
struct SummaryError {
    code: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SummaryModules {
    price: PriceModule,
    summary_detail: DetailModule,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PriceModule {
    short_name: Option<String>,
    long_name: Option<String>,
    market_cap: Option<Field>,
    regular_market_previous_close: Option<Field>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct DetailModule {
    market_cap: Option<Field>,
    volume: Option<Field>,
    previous_close: Option<Field>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<Field>,
    dividend_yield: Option<Field>,
}

/// A formatted number: `{"raw": 1.2, "fmt": "1.20"}`
#[derive(Debug, Deserialize)]
struct Field {
    raw: Option<serde_json::Value>,
}

/// Numeric value of a field; text that does not parse as a finite number is missing
fn number(field: &Option<Field>) -> Option<f64> {
    let raw = field.as_ref()?.raw.as_ref()?;
    raw.as_f64()
        .or_else(|| raw.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .filter(|v| v.is_finite())
}

/// Parse a quote summary response carrying the `price` and `summaryDetail` modules
pub fn parse_quote_summary(ticker: &str, body: &str) -> Result<TickerMetadata> {
    let response: SummaryResponse = serde_json::from_str(body)
        .map_err(|e| ForecastError::DataError(format!("Malformed quote summary: {}", e)))?;

    if let Some(error) = response.quote_summary.error {
        return Err(ForecastError::HttpError(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let modules = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ForecastError::DataError(format!("No quote summary for {}", ticker)))?;
    let price = &modules.price;
    let detail = &modules.summary_detail;

    Ok(TickerMetadata {
        ticker: ticker.to_string(),
        name: price
            .short_name
            .clone()
            .or_else(|| price.long_name.clone())
            .filter(|n| !n.trim().is_empty()),
        market_cap: number(&price.market_cap).or_else(|| number(&detail.market_cap)),
        volume: number(&detail.volume),
        previous_close: number(&price.regular_market_previous_close)
            .or_else(|| number(&detail.previous_close)),
        pe_ratio: number(&detail.trailing_pe),
        dividend_yield: number(&detail.dividend_yield),
    })
}

/// Yahoo Finance: history through `yahoo_finance_api`, metadata from the quote summary endpoint
pub struct YahooSource {
    connector: YahooConnector,
    client: Client,
    summary_url: String,
}

impl YahooSource {
    pub fn new() -> Result<Self> {
        Self::with_summary_url(QUOTE_SUMMARY_URL)
    }

    pub fn with_summary_url(summary_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stock_forecast/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            connector: YahooConnector::new(),
            client,
            summary_url: summary_url.trim_end_matches('/').to_string(),
        })
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

impl PriceSource for YahooSource {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>> {
        debug!(ticker, %start, %end, "requesting quote history");
        let response = self
            .connector
            .get_quote_history(ticker, midnight_utc(start), midnight_utc(end))?;
        bars_from_quotes(&response.quotes()?)
    }

    fn metadata(&self, ticker: &str) -> Result<TickerMetadata> {
        let url = format!("{}/{}", self.summary_url, ticker);
        debug!(ticker, "requesting quote summary");

        let response = self
            .client
            .get(&url)
            .query(&[("modules", "price,summaryDetail")])
            .send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return match parse_quote_summary(ticker, &body) {
                Err(ForecastError::HttpError(message)) => Err(ForecastError::HttpError(message)),
                _ => Err(ForecastError::HttpError(format!("Quote summary returned {}", status))),
            };
        }
        parse_quote_summary(ticker, &body)
    }
}

/// Metadata of every ticker, in the order given. A failed ticker is logged and skipped.
pub fn fetch_metadata<S: PriceSource + ?Sized>(source: &S, tickers: &[String]) -> BatchReport<TickerMetadata> {
    let mut report = BatchReport::new();
    for ticker in tickers {
        report.record(ticker, source.metadata(ticker));
    }
    report.log_summary("metadata");
    report
}

/// Raw table path of a ticker: `<dir>/<ticker>.csv`
pub fn raw_path(dir: &Path, ticker: &str) -> PathBuf {
    dir.join(format!("{}.csv", ticker))
}

fn download_one<S: PriceSource + ?Sized>(
    source: &S,
    ticker: &str,
    raw_dir: &Path,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PathBuf> {
    info!("Downloading data for {}...", ticker);
    let bars = source.fetch(ticker, start, end)?;
    if bars.is_empty() {
        return Err(ForecastError::EmptySeries(format!(
            "No data returned for {}",
            ticker
        )));
    }

    let path = raw_path(raw_dir, ticker);
    write_rows(&path, &RAW_HEADER, &bars)?;
    info!("Data for {} saved to {} ({} rows)", ticker, path.display(), bars.len());
    Ok(path)
}

/// Download every ticker into `raw_dir`. A failed ticker is logged and skipped.
pub fn download_all<S: PriceSource + ?Sized>(
    source: &S,
    tickers: &[String],
    raw_dir: &Path,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<BatchReport<PathBuf>> {
    ensure_output_dir(raw_dir)?;

    let mut report = BatchReport::new();
    for ticker in tickers {
        report.record(ticker, download_one(source, ticker, raw_dir, start, end));
    }
    report.log_summary("fetch");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = r#"{
        "quoteSummary": {
            "result": [{
                "price": {
                    "shortName": "TATA CONSULTANCY SERV LT",
                    "longName": "Tata Consultancy Services Limited",
                    "marketCap": {"raw": 14512345678901, "fmt": "14.51T"},
                    "regularMarketPreviousClose": {"raw": 4010.5, "fmt": "4,010.50"}
                },
                "summaryDetail": {
                    "volume": {"raw": 1834567, "fmt": "1.83M"},
                    "trailingPE": {"raw": "Infinity", "fmt": "∞"},
                    "dividendYield": {"raw": 0.0125, "fmt": "1.25%"}
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_quote_summary() {
        let meta = parse_quote_summary("TCS.NS", SUMMARY).unwrap();
        assert_eq!(meta.ticker, "TCS.NS");
        assert_eq!(meta.name.as_deref(), Some("TATA CONSULTANCY SERV LT"));
        assert_eq!(meta.market_cap, Some(14512345678901.0));
        assert_eq!(meta.previous_close, Some(4010.5));
        assert_eq!(meta.volume, Some(1834567.0));
        assert_eq!(meta.pe_ratio, None);
        assert_eq!(meta.dividend_yield, Some(0.0125));
    }

    #[test]
    fn test_parse_quote_summary_without_modules() {
        let body = r#"{"quoteSummary": {"result": [{}], "error": null}}"#;
        assert_eq!(parse_quote_summary("ZEEL.NS", body).unwrap(), TickerMetadata::unknown("ZEEL.NS"));

        let body = r#"{"quoteSummary": {"result": null, "error": {"code": "Not Found", "description": "Quote not found for ticker symbol: XYZ.NS"}}}"#;
        assert!(matches!(parse_quote_summary("XYZ.NS", body), Err(ForecastError::HttpError(_))));
    }

    #[test]
    fn test_bars_from_quotes() {
        let quotes = vec![
            Quote {
                timestamp: 1420170300,
                open: 1272.5,
                high: 1285.0,
                low: 1270.0,
                volume: 366830,
                close: 1281.0,
                adjclose: 1100.2,
            },
            Quote {
                timestamp: 1420429500,
                open: 1281.0,
                high: 1290.0,
                low: 1275.5,
                volume: 925740,
                close: 1288.0,
                adjclose: 1106.3,
            },
        ];
        let bars = bars_from_quotes(&quotes).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2015, 1, 2).unwrap());
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2015, 1, 5).unwrap());
        assert_eq!(bars[0].close, Some(1281.0));
        assert_eq!(bars[1].adj_close, Some(1106.3));
        assert_eq!(bars[0].volume, Some(366830.0));
    }

    struct FixedSource;

    impl PriceSource for FixedSource {
        fn fetch(&self, ticker: &str, start: NaiveDate, _end: NaiveDate) -> Result<Vec<RawBar>> {
            if ticker == "BAD.NS" {
                return Err(ForecastError::HttpError("No data found".to_string()));
            }
            Ok(vec![RawBar {
                date: start,
                open: Some(1.0),
                high: Some(2.0),
                low: None,
                close: Some(1.5),
                adj_close: Some(1.5),
                volume: Some(10.0),
            }])
        }

        fn metadata(&self, ticker: &str) -> Result<TickerMetadata> {
            if ticker == "BAD.NS" {
                return Err(ForecastError::HttpError("Quote not found".to_string()));
            }
            Ok(TickerMetadata {
                market_cap: Some(1e9),
                ..TickerMetadata::unknown(ticker)
            })
        }
    }

    #[test]
    fn test_download_all_skips_failed_tickers() {
        let dir = tempfile::tempdir().unwrap();
        let tickers = vec!["TCS.NS".to_string(), "BAD.NS".to_string()];
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();

        let report = download_all(&FixedSource, &tickers, dir.path(), day, day).unwrap();
        assert_eq!(report.outputs, vec![raw_path(dir.path(), "TCS.NS")]);
        assert!(report.failed("BAD.NS"));
        let text = std::fs::read_to_string(raw_path(dir.path(), "TCS.NS")).unwrap();
        assert_eq!(text, "Date,Open,High,Low,Close,Adj Close,Volume\n2020-01-01,1.0,2.0,,1.5,1.5,10.0\n");

        let meta = fetch_metadata(&FixedSource, &tickers);
        assert_eq!(meta.outputs.len(), 1);
        assert!(meta.failed("BAD.NS"));
    }
}
