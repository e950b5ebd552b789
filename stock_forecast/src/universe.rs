//! The NSE ticker universe and the curated subset carried through modelling

use serde::{Deserialize, Serialize};

/// A ticker with the sector it is reported under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub ticker: String,
    pub sector: String,
}

impl TickerInfo {
    pub fn new(ticker: &str, sector: &str) -> Self {
        Self {
            ticker: ticker.to_string(),
            sector: sector.to_string(),
        }
    }
}

const UNIVERSE: &[(&str, &str)] = &[
    ("RELIANCE.NS", "Energy"),
    ("TCS.NS", "Information Technology"),
    ("INFY.NS", "Information Technology"),
    ("HDFCBANK.NS", "Banking and Financial Services"),
    ("ICICIBANK.NS", "Banking and Financial Services"),
    ("SBIN.NS", "Banking and Financial Services"),
    ("HINDUNILVR.NS", "Consumer Goods"),
    ("BHARTIARTL.NS", "Telecommunications"),
    ("ITC.NS", "Consumer Goods"),
    ("LT.NS", "Cement and Construction"),
    ("ASIANPAINT.NS", "Consumer Goods"),
    ("MARUTI.NS", "Automobiles"),
    ("AXISBANK.NS", "Banking and Financial Services"),
    ("WIPRO.NS", "Information Technology"),
    ("HCLTECH.NS", "Information Technology"),
    ("BAJFINANCE.NS", "Banking and Financial Services"),
    ("KOTAKBANK.NS", "Banking and Financial Services"),
    ("TATAMOTORS.NS", "Automobiles"),
    ("SUNPHARMA.NS", "Healthcare and Pharmaceuticals"),
    ("ULTRACEMCO.NS", "Cement and Construction"),
    ("ADANIENT.NS", "Energy"),
    ("NTPC.NS", "Energy"),
    ("POWERGRID.NS", "Energy"),
    ("TATASTEEL.NS", "Metals and Mining"),
    ("JSWSTEEL.NS", "Metals and Mining"),
    ("HDFCLIFE.NS", "Banking and Financial Services"),
    ("TECHM.NS", "Information Technology"),
    ("MARICO.NS", "Consumer Goods"),
    ("BRITANNIA.NS", "Consumer Goods"),
    ("DRREDDY.NS", "Healthcare and Pharmaceuticals"),
    ("DIVISLAB.NS", "Healthcare and Pharmaceuticals"),
    ("EICHERMOT.NS", "Automobiles"),
    ("DMART.NS", "Retail"),
    ("MOTHERSON.NS", "Automobiles"),
    ("BAJAJ-AUTO.NS", "Automobiles"),
    ("HEROMOTOCO.NS", "Automobiles"),
    ("BHARATFORG.NS", "Automobiles"),
    ("UPL.NS", "Chemicals"),
    ("HINDALCO.NS", "Metals and Mining"),
    ("INDUSINDBK.NS", "Banking and Financial Services"),
    ("GRASIM.NS", "Cement and Construction"),
    ("BAJAJFINSV.NS", "Banking and Financial Services"),
    ("BPCL.NS", "Energy"),
    ("IOC.NS", "Energy"),
    ("CIPLA.NS", "Healthcare and Pharmaceuticals"),
    ("LUPIN.NS", "Healthcare and Pharmaceuticals"),
    ("M&M.NS", "Automobiles"),
    ("SBILIFE.NS", "Banking and Financial Services"),
    ("ZEEL.NS", "Media"),
];

// Three per sector, plus the lone telecom name
const SELECTION: &[&str] = &[
    "M&M.NS", "MARUTI.NS", "TATAMOTORS.NS",
    "HDFCBANK.NS", "ICICIBANK.NS", "SBIN.NS",
    "LT.NS", "ULTRACEMCO.NS", "GRASIM.NS",
    "HINDUNILVR.NS", "ITC.NS", "ASIANPAINT.NS",
    "RELIANCE.NS", "NTPC.NS", "ADANIENT.NS",
    "SUNPHARMA.NS", "DIVISLAB.NS", "CIPLA.NS",
    "TCS.NS", "INFY.NS", "HCLTECH.NS",
    "JSWSTEEL.NS", "TATASTEEL.NS", "HINDALCO.NS",
    "BHARTIARTL.NS",
];

/// Every ticker the pipeline knows about, with sectors
pub fn default_universe() -> Vec<TickerInfo> {
    UNIVERSE
        .iter()
        .map(|(ticker, sector)| TickerInfo::new(ticker, sector))
        .collect()
}

/// The curated tickers that are carried into modelling
pub fn default_selection() -> Vec<String> {
    SELECTION.iter().map(|t| t.to_string()).collect()
}

/// Look up the sector of a ticker
pub fn sector_of<'a>(universe: &'a [TickerInfo], ticker: &str) -> Option<&'a str> {
    universe
        .iter()
        .find(|info| info.ticker == ticker)
        .map(|info| info.sector.as_str())
}
