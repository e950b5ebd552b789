//! Per-file batch processing
//!
//! A stage walks the CSV files of one directory and handles each file on its
//! own. A failing file becomes an [`ItemFailure`] in the [`BatchReport`] and
//! the walk continues; only a missing input directory stops a stage, and it
//! does so before the first file is touched.

use crate::error::{ForecastError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A file that could not be processed, and why
#[derive(Debug)]
pub struct ItemFailure {
    /// Item name, usually the file name
    pub item: String,
    pub error: ForecastError,
}

/// Outputs and failures of one pass over a directory
#[derive(Debug)]
pub struct BatchReport<T> {
    pub outputs: Vec<T>,
    pub failures: Vec<ItemFailure>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            outputs: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one item. Failures are logged and kept.
    pub fn record(&mut self, item: &str, outcome: Result<T>) {
        match outcome {
            Ok(output) => self.outputs.push(output),
            Err(error) => {
                warn!(item, %error, "skipping item");
                self.failures.push(ItemFailure {
                    item: item.to_string(),
                    error,
                });
            }
        }
    }

    /// Whether the item with this name failed
    pub fn failed(&self, item: &str) -> bool {
        self.failures.iter().any(|f| f.item == item)
    }

    /// Log a one-line summary of the pass
    pub fn log_summary(&self, stage: &str) {
        info!(
            stage,
            succeeded = self.outputs.len(),
            failed = self.failures.len(),
            "batch finished"
        );
    }
}

/// Fail fast when a stage's input directory is missing
pub fn ensure_input_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ForecastError::MissingDirectory(dir.to_path_buf()))
    }
}

/// Create an output directory if needed. Safe to call repeatedly.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

/// The `*.csv` files directly inside `dir`, ordered by file name
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    ensure_input_dir(dir)?;

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .file_name()
            .and_then(|n| n.to_str())
            .map_or(false, |n| n.ends_with(".csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}

/// File name of a path for log and failure messages
pub fn item_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_list_csv_files_filters_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["b.csv", "a.csv", "notes.txt", "c.csv.bak"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = list_csv_files(dir.path()).unwrap();
        let names: Vec<String> = files.iter().map(|p| item_name(p)).collect();
        assert_eq!(names, vec!["a.csv", "b.csv"]);
    }

    #[test]
    fn test_missing_input_dir_fails_fast() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("absent");
        assert!(matches!(
            list_csv_files(&missing),
            Err(ForecastError::MissingDirectory(p)) if p == missing
        ));
    }

    #[test]
    fn test_report_records_outcomes() {
        let mut report: BatchReport<u32> = BatchReport::new();
        report.record("ok.csv", Ok(1));
        report.record("bad.csv", Err(ForecastError::DataError("broken".to_string())));

        assert_eq!(report.outputs, vec![1]);
        assert!(report.failed("bad.csv"));
        assert!(!report.failed("ok.csv"));
    }

    #[test]
    fn test_ensure_output_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("a/b");
        ensure_output_dir(&out).unwrap();
        ensure_output_dir(&out).unwrap();
        assert!(out.is_dir());
    }
}
