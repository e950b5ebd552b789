//! Selection stage: copy the curated tickers from the clean data

use crate::batch::{ensure_input_dir, ensure_output_dir, item_name, list_csv_files, BatchReport};
use crate::data::{ticker_from_path, PriceSeries};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn select_file(path: &Path, selected_dir: &Path) -> Result<PathBuf> {
    let series = PriceSeries::from_csv(path)?;
    let out = selected_dir.join(item_name(path));
    series.write_csv(&out)?;
    info!("Selected data for {} saved to {}", series.ticker(), out.display());
    Ok(out)
}

/// Copy every clean table whose ticker is in `selection` to `selected_dir`.
///
/// Tables are re-read before they are written, so a malformed clean table is
/// reported instead of copied.
pub fn select_stocks(
    clean_dir: &Path,
    selected_dir: &Path,
    selection: &[String],
) -> Result<BatchReport<PathBuf>> {
    ensure_input_dir(clean_dir)?;
    ensure_output_dir(selected_dir)?;

    let files = list_csv_files(clean_dir)?;
    let mut report = BatchReport::new();
    for path in &files {
        let ticker = ticker_from_path(path);
        if !selection.contains(&ticker) {
            debug!(ticker = %ticker, "not selected");
            continue;
        }
        report.record(&item_name(path), select_file(path, selected_dir));
    }

    for ticker in selection {
        if !files.iter().any(|p| ticker_from_path(p) == *ticker) {
            warn!(ticker = %ticker, "selected ticker has no clean data");
        }
    }

    report.log_summary("select");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_only_selected_tickers_are_copied() {
        let clean = tempdir().unwrap();
        let selected = tempdir().unwrap();
        let table = "Date,Open,High,Low,Close,Volume\n2020-01-01,1.0,1.0,1.0,1.0,10.0\n";
        fs::write(clean.path().join("TCS.NS.csv"), table).unwrap();
        fs::write(clean.path().join("ZEEL.NS.csv"), table).unwrap();

        let selection = vec!["TCS.NS".to_string(), "INFY.NS".to_string()];
        let report = select_stocks(clean.path(), selected.path(), &selection).unwrap();

        assert_eq!(report.outputs, vec![selected.path().join("TCS.NS.csv")]);
        assert!(!selected.path().join("ZEEL.NS.csv").exists());
        assert_eq!(fs::read_to_string(&report.outputs[0]).unwrap(), table);
    }
}
