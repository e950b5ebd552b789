//! Hypothesis tests over the combined metrics table
//!
//! - H1: the neural models (LSTM and Hybrid together) against ARIMA
//! - H2: Hybrid against LSTM
//!
//! Each is a two-sided Welch t-test on MAE and on RMSE, with a box plot of
//! both groups. The combined table is only read.

use crate::aggregation::read_combined;
use crate::batch::ensure_output_dir;
use crate::data::write_rows;
use crate::error::Result;
use crate::metrics::{CombinedRecord, Metric, Model};
use crate::plots::box_plot;
use forecast_math::{welch_t_test, FiveNumberSummary, TTestResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Metrics each hypothesis is tested on
pub const TESTED_METRICS: [Metric; 2] = [Metric::Mae, Metric::Rmse];

const RESULTS_HEADER: [&str; 5] = ["Hypothesis", "Metric", "T", "DF", "PValue"];
const SUMMARY_HEADER: [&str; 7] = ["Group", "Count", "Min", "Q1", "Median", "Q3", "Max"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hypothesis {
    /// Advanced models (LSTM + Hybrid) vs ARIMA
    H1,
    /// Hybrid vs LSTM
    H2,
}

impl Hypothesis {
    pub const ALL: [Hypothesis; 2] = [Hypothesis::H1, Hypothesis::H2];

    pub fn label(&self) -> &'static str {
        match self {
            Hypothesis::H1 => "H1",
            Hypothesis::H2 => "H2",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Hypothesis::H1 => "Advanced Models vs ARIMA",
            Hypothesis::H2 => "Hybrid vs LSTM",
        }
    }

    /// The two groups compared, first minus second
    pub fn groups(&self) -> [Group; 2] {
        match self {
            Hypothesis::H1 => [
                Group {
                    label: "Advanced Models (LSTM + Hybrid)",
                    models: &[Model::Lstm, Model::Hybrid],
                },
                Group {
                    label: "ARIMA",
                    models: &[Model::Arima],
                },
            ],
            Hypothesis::H2 => [
                Group {
                    label: "Hybrid",
                    models: &[Model::Hybrid],
                },
                Group {
                    label: "LSTM",
                    models: &[Model::Lstm],
                },
            ],
        }
    }
}

/// Rows of the combined table belonging to a set of models
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group {
    pub label: &'static str,
    pub models: &'static [Model],
}

impl Group {
    /// Metric values of this group, in the order the models are listed
    pub fn values(&self, records: &[CombinedRecord], metric: Metric) -> Vec<f64> {
        self.models
            .iter()
            .flat_map(move |model| {
                records
                    .iter()
                    .filter(move |r| r.model == *model)
                    .map(move |r| metric.value(r))
            })
            .collect()
    }
}

/// Result of one hypothesis on one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypothesisOutcome {
    pub hypothesis: Hypothesis,
    pub metric: Metric,
    pub result: TTestResult,
}

#[derive(Debug, Serialize)]
struct OutcomeRow<'a> {
    hypothesis: &'a str,
    metric: &'a str,
    t: f64,
    df: f64,
    p_value: f64,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    group: &'a str,
    count: usize,
    min: f64,
    q1: f64,
    median: f64,
    q3: f64,
    max: f64,
}

pub fn test_hypothesis(records: &[CombinedRecord], hypothesis: Hypothesis, metric: Metric) -> Result<HypothesisOutcome> {
    let [a, b] = hypothesis.groups();
    let result = welch_t_test(&a.values(records, metric), &b.values(records, metric))?;
    Ok(HypothesisOutcome {
        hypothesis,
        metric,
        result,
    })
}

/// Run both hypotheses on MAE and RMSE
pub fn run_hypothesis_tests(records: &[CombinedRecord]) -> Result<Vec<HypothesisOutcome>> {
    let mut outcomes = Vec::with_capacity(Hypothesis::ALL.len() * TESTED_METRICS.len());
    for hypothesis in Hypothesis::ALL {
        for metric in TESTED_METRICS {
            outcomes.push(test_hypothesis(records, hypothesis, metric)?);
        }
    }
    Ok(outcomes)
}

/// Human-readable report, p-values to five decimals
pub fn format_outcomes(outcomes: &[HypothesisOutcome]) -> String {
    let mut out = String::new();
    for hypothesis in Hypothesis::ALL {
        out.push_str(&format!("\n{} Results: {}\n", hypothesis.label(), hypothesis.description()));
        for outcome in outcomes.iter().filter(|o| o.hypothesis == hypothesis) {
            out.push_str(&format!(
                "{} T-test p-value: {:.5}\n",
                outcome.metric.label(),
                outcome.result.p_value
            ));
        }
    }
    out
}

pub fn write_outcomes(path: &Path, outcomes: &[HypothesisOutcome]) -> Result<()> {
    let rows: Vec<OutcomeRow> = outcomes
        .iter()
        .map(|o| OutcomeRow {
            hypothesis: o.hypothesis.label(),
            metric: o.metric.label(),
            t: o.result.statistic,
            df: o.result.df,
            p_value: o.result.p_value,
        })
        .collect();
    write_rows(path, &RESULTS_HEADER, &rows)
}

/// Write the five-number summary of both groups of a comparison,
/// to `<dir>/<hypothesis>_<metric>_comparison.csv`, and draw it as a box plot
/// next to it. An empty group is left out. A chart that cannot be drawn is
/// logged; the table is still returned.
pub fn write_group_summaries(
    dir: &Path,
    records: &[CombinedRecord],
    hypothesis: Hypothesis,
    metric: Metric,
) -> Result<PathBuf> {
    let summaries: Vec<(&str, FiveNumberSummary)> = hypothesis
        .groups()
        .iter()
        .filter_map(|group| match FiveNumberSummary::from_values(&group.values(records, metric)) {
            Ok(summary) => Some((group.label, summary)),
            Err(error) => {
                warn!(group = group.label, %error, "no values to summarise");
                None
            }
        })
        .collect();

    let rows: Vec<SummaryRow> = summaries
        .iter()
        .map(|(group, s)| SummaryRow {
            group: *group,
            count: s.count,
            min: s.min,
            q1: s.q1,
            median: s.median,
            q3: s.q3,
            max: s.max,
        })
        .collect();

    let stem = format!("{}_{}_comparison", hypothesis.label(), metric.label());
    let path = dir.join(format!("{}.csv", stem));
    write_rows(&path, &SUMMARY_HEADER, &rows)?;

    let chart = dir.join(format!("{}.png", stem));
    let title = format!("{}: {} Comparison", hypothesis.label(), metric.label());
    if let Err(error) = box_plot(&chart, &title, metric.label(), &summaries) {
        warn!(chart = %chart.display(), %error, "box plot not drawn");
    }
    Ok(path)
}

/// Test both hypotheses on the combined table in `combined_file` and write the
/// results table and group summaries to `out_dir`
pub fn run_hypothesis(combined_file: &Path, out_dir: &Path) -> Result<Vec<HypothesisOutcome>> {
    let records = read_combined(combined_file)?;
    ensure_output_dir(out_dir)?;

    let outcomes = run_hypothesis_tests(&records)?;
    write_outcomes(&out_dir.join("hypothesis_results.csv"), &outcomes)?;

    for hypothesis in Hypothesis::ALL {
        for metric in TESTED_METRICS {
            write_group_summaries(out_dir, &records, hypothesis, metric)?;
        }
    }

    info!("Hypothesis testing completed, results saved to {}", out_dir.display());
    Ok(outcomes)
}
