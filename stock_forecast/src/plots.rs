//! PNG charts of the pipeline tables
//!
//! Every chart is drawn into a temporary file next to its destination and
//! renamed into place. Captions, axis labels and legends need the
//! `chart-labels` feature; when no font can be loaded the chart is redrawn
//! without them.

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use forecast_math::FiveNumberSummary;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use tracing::debug;

const SIZE: (u32, u32) = (1200, 600);
const PALETTE: [RGBColor; 4] = [BLUE, RED, GREEN, MAGENTA];

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

fn render_png<F>(path: &Path, draw: F) -> Result<()>
where
    F: Fn(&Area<'_>, bool) -> DrawResult,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::Builder::new()
        .prefix(".chart")
        .suffix(".png")
        .tempfile_in(dir)?;

    let attempt = |labels: bool| -> DrawResult {
        let root = BitMapBackend::new(tmp.path(), SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root, labels)?;
        root.present()?;
        Ok(())
    };

    if let Err(error) = attempt(true) {
        debug!(path = %path.display(), %error, "redrawing chart without text");
        attempt(false).map_err(|e| ForecastError::PlotError(format!("{}: {}", path.display(), e)))?;
    }

    tmp.persist(path)?;
    Ok(())
}

/// Smallest and largest finite value, padded by 5%
fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return None;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    Some((lo - pad, hi + pad))
}

fn nothing_to_plot(path: &Path) -> ForecastError {
    ForecastError::EmptySeries(format!("no finite values to plot in {}", path.display()))
}

fn date_label(dates: &[NaiveDate], x: f64) -> String {
    dates
        .get(x.round().max(0.0) as usize)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Line chart of one or more series sharing a date axis.
///
/// Missing and non-finite values are left out of their line.
pub fn line_chart(
    path: &Path,
    title: &str,
    y_label: &str,
    dates: &[NaiveDate],
    lines: &[(&str, Vec<Option<f64>>)],
) -> Result<()> {
    let (y_min, y_max) = value_range(lines.iter().flat_map(|(_, v)| v.iter().flatten().copied()))
        .ok_or_else(|| nothing_to_plot(path))?;
    let x_max = (dates.len().max(2) - 1) as f64;

    render_png(path, |root, labels| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(15);
        if labels {
            builder
                .caption(title, ("sans-serif", 24))
                .x_label_area_size(40)
                .y_label_area_size(70);
        }
        let mut chart = builder.build_cartesian_2d(0f64..x_max, y_min..y_max)?;

        if labels {
            chart
                .configure_mesh()
                .x_desc("Date")
                .y_desc(y_label)
                .x_labels(8)
                .x_label_formatter(&|x: &f64| date_label(dates, *x))
                .draw()?;
        }

        for (i, (name, values)) in lines.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let points = values
                .iter()
                .enumerate()
                .filter_map(|(t, v)| v.filter(|v| v.is_finite()).map(|v| (t as f64, v)));
            let series = chart.draw_series(LineSeries::new(points, color.stroke_width(2)))?;
            if labels {
                series
                    .label(*name)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            }
        }

        if labels {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }
        Ok(())
    })
}

/// Bars grouped by category, one bar per series in each group.
///
/// Bars rise from zero; a missing or non-finite value leaves a gap.
pub fn grouped_bar_chart(
    path: &Path,
    title: &str,
    y_label: &str,
    categories: &[String],
    series: &[(&str, Vec<Option<f64>>)],
) -> Result<()> {
    let (_, top) = value_range(series.iter().flat_map(|(_, v)| v.iter().flatten().copied()))
        .ok_or_else(|| nothing_to_plot(path))?;
    let y_top = if top > 0.0 { top * 1.05 } else { 1.0 };
    let x_max = categories.len().max(1) as f64;
    let width = 0.8 / series.len().max(1) as f64;

    render_png(path, |root, labels| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(15);
        if labels {
            builder
                .caption(title, ("sans-serif", 24))
                .x_label_area_size(60)
                .y_label_area_size(80);
        }
        let mut chart = builder.build_cartesian_2d(0f64..x_max, 0f64..y_top)?;

        if labels {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc("Stocks")
                .y_desc(y_label)
                .x_labels(categories.len() + 1)
                .x_label_formatter(&|x: &f64| {
                    categories
                        .get(x.floor().max(0.0) as usize)
                        .cloned()
                        .unwrap_or_default()
                })
                .draw()?;
        }

        for (j, (name, values)) in series.iter().enumerate() {
            let color = PALETTE[j % PALETTE.len()];
            let bars = values.iter().enumerate().filter_map(|(i, v)| {
                let v = v.filter(|v| v.is_finite())?;
                let x0 = i as f64 + 0.1 + j as f64 * width;
                Some(Rectangle::new([(x0, 0.0), (x0 + width, v)], color.filled()))
            });
            let drawn = chart.draw_series(bars)?;
            if labels {
                drawn
                    .label(*name)
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            }
        }

        if labels {
            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }
        Ok(())
    })
}

/// Box plot drawn from precomputed five-number summaries, one box per group
pub fn box_plot(
    path: &Path,
    title: &str,
    y_label: &str,
    groups: &[(&str, FiveNumberSummary)],
) -> Result<()> {
    let (y_min, y_max) = value_range(groups.iter().flat_map(|(_, s)| [s.min, s.max]))
        .ok_or_else(|| nothing_to_plot(path))?;
    let x_max = groups.len().max(1) as f64;

    render_png(path, |root, labels| {
        let mut builder = ChartBuilder::on(root);
        builder.margin(15);
        if labels {
            builder
                .caption(title, ("sans-serif", 24))
                .x_label_area_size(40)
                .y_label_area_size(80);
        }
        let mut chart = builder.build_cartesian_2d(0f64..x_max, y_min..y_max)?;

        if labels {
            chart
                .configure_mesh()
                .disable_x_mesh()
                .y_desc(y_label)
                .x_labels(groups.len() * 2 + 1)
                .x_label_formatter(&|x: &f64| {
                    let slot = x - 0.5;
                    if slot < 0.0 || (slot - slot.round()).abs() > 1e-6 {
                        return String::new();
                    }
                    groups
                        .get(slot.round() as usize)
                        .map(|(name, _)| name.to_string())
                        .unwrap_or_default()
                })
                .draw()?;
        }

        for (i, (_, s)) in groups.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let c = i as f64 + 0.5;
            chart.draw_series([
                Rectangle::new([(c - 0.2, s.q1), (c + 0.2, s.q3)], color.mix(0.3).filled()),
                Rectangle::new([(c - 0.2, s.q1), (c + 0.2, s.q3)], color.stroke_width(2)),
            ])?;
            chart.draw_series([
                PathElement::new(vec![(c, s.min), (c, s.q1)], BLACK.stroke_width(1)),
                PathElement::new(vec![(c, s.q3), (c, s.max)], BLACK.stroke_width(1)),
                PathElement::new(vec![(c - 0.1, s.min), (c + 0.1, s.min)], BLACK.stroke_width(1)),
                PathElement::new(vec![(c - 0.1, s.max), (c + 0.1, s.max)], BLACK.stroke_width(1)),
                PathElement::new(vec![(c - 0.2, s.median), (c + 0.2, s.median)], color.stroke_width(3)),
            ])?;
        }
        Ok(())
    })
}
