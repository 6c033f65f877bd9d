//! Chart rendering functions
//!
//! Each function draws one chart from a dataset and writes a PNG to the given
//! path. Nothing is returned for downstream consumption.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};
use plotters::prelude::*;
use polars::prelude::*;

use crate::pipeline::schema::{LOSS_RATIO_COLUMN, TOTAL_CLAIMS};
use crate::viz::style::PlotStyle;

const HISTOGRAM_BINS: usize = 30;

/// Deterministic file name for a hypothesis-test chart.
pub fn hypothesis_plot_path(dir: &Path, group: &str, metric: &str, kind: &str) -> PathBuf {
    dir.join(format!("{group}_vs_{metric}_{kind}.png"))
}

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("chart rendering failed: {e}")
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Non-null Float64 values of a column.
fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let cast = df.column(column)?.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().flatten().collect())
}

/// (group label, non-null metric values) pairs ordered by label.
fn grouped_values(df: &DataFrame, group: &str, metric: &str) -> Result<Vec<(String, Vec<f64>)>> {
    let keys = df.column(group)?.cast(&DataType::String)?;
    let keys = keys.str()?;
    let values = df.column(metric)?.cast(&DataType::Float64)?;
    let values = values.f64()?;

    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        if let (Some(key), Some(value)) = (key, value) {
            grouped.entry(key.to_string()).or_default().push(value);
        }
    }
    Ok(grouped.into_iter().collect())
}

/// Histogram of a numeric column.
pub fn plot_numerical_distribution(
    df: &DataFrame,
    column: &str,
    style: &PlotStyle,
    save_path: &Path,
) -> Result<()> {
    let values = numeric_values(df, column)?;
    if values.is_empty() {
        return Ok(());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        max = min + 1.0;
    }
    let bin_width = (max - min) / HISTOGRAM_BINS as f64;

    let mut counts = vec![0u64; HISTOGRAM_BINS];
    for v in &values {
        let bin = (((v - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1;
    }
    let y_max = counts.iter().copied().max().unwrap_or(1) as f64 * 1.1;

    ensure_parent(save_path)?;
    let root = BitMapBackend::new(save_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Distribution of {column}"),
            ("sans-serif", style.caption_size),
        )
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(min..max, 0.0..y_max)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_desc(column)
        .y_desc("Frequency")
        .draw()
        .map_err(draw_err)?;
    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + i as f64 * bin_width;
            Rectangle::new([(x0, 0.0), (x0 + bin_width, count as f64)], style.primary.filled())
        }))
        .map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Bar chart of category frequencies, most frequent first.
pub fn plot_categorical_distribution(
    df: &DataFrame,
    column: &str,
    style: &PlotStyle,
    save_path: &Path,
) -> Result<()> {
    let cast = df.column(column)?.cast(&DataType::String)?;
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for value in cast.str()?.into_iter().flatten() {
        *counts.entry(value.to_string()).or_default() += 1;
    }
    if counts.is_empty() {
        return Ok(());
    }

    let mut bars: Vec<(String, u64)> = counts.into_iter().collect();
    bars.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let labels: Vec<String> = bars.iter().map(|(name, _)| name.clone()).collect();
    let y_max = bars.first().map(|(_, c)| *c).unwrap_or(1) as f64 * 1.1;

    ensure_parent(save_path)?;
    let root = BitMapBackend::new(save_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Distribution of {column}"),
            ("sans-serif", style.caption_size),
        )
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..bars.len() as f64, 0.0..y_max)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_labels(labels.len().min(20))
        .x_label_formatter(&|x| {
            labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("Count")
        .draw()
        .map_err(draw_err)?;
    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, count))| {
            Rectangle::new(
                [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *count as f64)],
                style.primary.filled(),
            )
        }))
        .map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Mean loss ratio per category. Expects the persisted `LossRatio` column
/// (see [`crate::pipeline::eda::with_loss_ratio`]).
pub fn plot_loss_ratio_by_category(
    df: &DataFrame,
    category: &str,
    style: &PlotStyle,
    save_path: &Path,
) -> Result<()> {
    let groups = grouped_values(df, category, LOSS_RATIO_COLUMN)?;
    if groups.is_empty() {
        return Ok(());
    }

    let means: Vec<(String, f64)> = groups
        .into_iter()
        .map(|(name, values)| {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            (name, mean)
        })
        .collect();
    let labels: Vec<String> = means.iter().map(|(name, _)| name.clone()).collect();
    let y_max = means.iter().map(|(_, m)| *m).fold(0.0, f64::max).max(1e-9) * 1.1;

    ensure_parent(save_path)?;
    let root = BitMapBackend::new(save_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Loss Ratio by {category}"),
            ("sans-serif", style.caption_size),
        )
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..means.len() as f64, 0.0..y_max)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_labels(labels.len().min(20))
        .x_label_formatter(&|x| {
            labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("Loss Ratio (Claims/Premium)")
        .draw()
        .map_err(draw_err)?;
    chart
        .draw_series(means.iter().enumerate().map(|(i, (_, mean))| {
            Rectangle::new(
                [(i as f64 + 0.1, 0.0), (i as f64 + 0.9, *mean)],
                style.accent.filled(),
            )
        }))
        .map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Monthly claim-record counts as a line chart.
pub fn plot_temporal_trend(
    df: &DataFrame,
    date_col: &str,
    style: &PlotStyle,
    save_path: &Path,
) -> Result<()> {
    let days = df.column(date_col)?.cast(&DataType::Int32)?;
    let days = days.i32()?;
    let claims = df.column(TOTAL_CLAIMS)?.cast(&DataType::Float64)?;
    let claims = claims.f64()?;

    let mut monthly: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for (day, claim) in days.into_iter().zip(claims) {
        if let (Some(day), Some(_)) = (day, claim) {
            let date = NaiveDate::default() + Duration::days(day as i64);
            *monthly.entry((date.year(), date.month())).or_default() += 1;
        }
    }
    if monthly.is_empty() {
        return Ok(());
    }

    let labels: Vec<String> = monthly
        .keys()
        .map(|(y, m)| format!("{y}-{m:02}"))
        .collect();
    let points: Vec<(f64, f64)> = monthly
        .values()
        .enumerate()
        .map(|(i, &count)| (i as f64, count as f64))
        .collect();
    let y_max = points.iter().map(|(_, c)| *c).fold(0.0, f64::max) * 1.1;

    ensure_parent(save_path)?;
    let root = BitMapBackend::new(save_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Claim Frequency", ("sans-serif", style.caption_size))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..points.len() as f64, 0.0..y_max)
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_labels(labels.len().min(12))
        .x_label_formatter(&|x| {
            labels
                .get(x.floor() as usize)
                .cloned()
                .unwrap_or_default()
        })
        .y_desc("Number of Claims")
        .draw()
        .map_err(draw_err)?;
    chart
        .draw_series(LineSeries::new(points, &style.primary))
        .map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Pearson correlation heatmap over the given numeric columns.
pub fn plot_correlation_matrix(
    df: &DataFrame,
    cols: &[String],
    style: &PlotStyle,
    save_path: &Path,
) -> Result<()> {
    let n = cols.len();
    if n < 2 {
        return Ok(());
    }

    let mut series: Vec<Vec<Option<f64>>> = Vec::with_capacity(n);
    for name in cols {
        let cast = df.column(name)?.cast(&DataType::Float64)?;
        series.push(cast.f64()?.into_iter().collect());
    }

    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let corr = pearson_correlation(&series[i], &series[j]).unwrap_or(f64::NAN);
            matrix[i][j] = corr;
            matrix[j][i] = corr;
        }
    }

    ensure_parent(save_path)?;
    let root = BitMapBackend::new(save_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Correlation Matrix of Numerical Features",
            ("sans-serif", style.caption_size),
        )
        .margin(10)
        .x_label_area_size(80)
        .y_label_area_size(100)
        .build_cartesian_2d(0..n as i32, 0..n as i32)
        .map_err(draw_err)?;
    let labels = cols.to_vec();
    chart
        .configure_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&|x| labels.get(*x as usize).cloned().unwrap_or_default())
        .y_label_formatter(&|y| labels.get(*y as usize).cloned().unwrap_or_default())
        .disable_mesh()
        .draw()
        .map_err(draw_err)?;
    chart
        .draw_series((0..n).flat_map(|i| {
            let row = matrix[i].clone();
            (0..n).map(move |j| {
                Rectangle::new(
                    [(j as i32, i as i32), (j as i32 + 1, i as i32 + 1)],
                    correlation_color(row[j]).filled(),
                )
            })
        }))
        .map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Box plot of the metric per group, the hypothesis-test companion chart.
pub fn plot_group_distribution(
    df: &DataFrame,
    group: &str,
    metric: &str,
    style: &PlotStyle,
    save_path: &Path,
) -> Result<()> {
    let groups = grouped_values(df, group, metric)?;
    if groups.is_empty() {
        return Ok(());
    }

    let all: Vec<f64> = groups.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    let y_min = all.iter().copied().fold(f64::INFINITY, f64::min);
    let mut y_max = all.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }
    let pad = (y_max - y_min) * 0.1;
    let labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();

    ensure_parent(save_path)?;
    let root = BitMapBackend::new(save_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{metric} by {group}"),
            ("sans-serif", style.caption_size),
        )
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0..groups.len()).into_segmented(),
            ((y_min - pad) as f32)..((y_max + pad) as f32),
        )
        .map_err(draw_err)?;
    chart
        .configure_mesh()
        .x_label_formatter(&|seg| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                labels.get(*i).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        })
        .y_desc(metric)
        .draw()
        .map_err(draw_err)?;
    chart
        .draw_series(groups.iter().enumerate().map(|(i, (_, values))| {
            Boxplot::new_vertical(SegmentValue::CenterOf(i), &Quartiles::new(values))
        }))
        .map_err(draw_err)?;
    root.present().map_err(draw_err)?;
    Ok(())
}

/// Single-pass Pearson correlation over paired non-null values.
fn pearson_correlation(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        if let (Some(x), Some(y)) = (x, y) {
            n += 1.0;
            let dx = x - mean_x;
            let dy = y - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (x - mean_x);
            var_y += dy * (y - mean_y);
            cov_xy += dx * (y - mean_y);
        }
    }

    if n < 2.0 {
        return None;
    }
    let std_x = (var_x / n).sqrt();
    let std_y = (var_y / n).sqrt();
    if std_x == 0.0 || std_y == 0.0 {
        return None;
    }
    Some(cov_xy / (n * std_x * std_y))
}

/// Blue (-1) through white (0) to red (+1); grey for missing.
fn correlation_color(corr: f64) -> RGBColor {
    if corr.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let c = corr.clamp(-1.0, 1.0);
    if c >= 0.0 {
        let t = c;
        RGBColor(
            255,
            (255.0 * (1.0 - t)) as u8,
            (255.0 * (1.0 - t)) as u8,
        )
    } else {
        let t = -c;
        RGBColor(
            (255.0 * (1.0 - t)) as u8,
            (255.0 * (1.0 - t)) as u8,
            255,
        )
    }
}
