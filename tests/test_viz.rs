//! Integration tests for chart rendering

use claimlens::pipeline::with_loss_ratio;
use claimlens::viz::{
    hypothesis_plot_path, plot_categorical_distribution, plot_correlation_matrix,
    plot_group_distribution, plot_loss_ratio_by_category, plot_numerical_distribution, PlotStyle,
};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_plot_path_naming() {
    let path = hypothesis_plot_path(Path::new("plots"), "Province", "TotalClaims", "box");
    assert_eq!(path, PathBuf::from("plots/Province_vs_TotalClaims_box.png"));
}

#[test]
fn test_histogram_written_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("claims_hist.png");
    let df = common::create_claims_dataframe();

    plot_numerical_distribution(&df, "TotalClaims", &PlotStyle::default(), &path).unwrap();

    assert!(path.exists());
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn test_empty_column_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.png");
    let df = df! {
        "TotalClaims" => [None::<f64>, None, None],
    }
    .unwrap();

    plot_numerical_distribution(&df, "TotalClaims", &PlotStyle::default(), &path).unwrap();

    assert!(!path.exists());
}

#[test]
fn test_categorical_bar_chart_written() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("province_bars.png");
    let df = common::create_claims_dataframe();

    plot_categorical_distribution(&df, "Province", &PlotStyle::default(), &path).unwrap();

    assert!(path.exists());
}

#[test]
fn test_loss_ratio_chart_needs_persisted_column() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("loss_ratio.png");
    let df = with_loss_ratio(common::create_claims_dataframe()).unwrap();

    plot_loss_ratio_by_category(&df, "Province", &PlotStyle::default(), &path).unwrap();

    assert!(path.exists());
}

#[test]
fn test_correlation_matrix_written() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corr.png");
    let df = common::create_claims_dataframe();
    let cols = vec![
        "TotalPremium".to_string(),
        "TotalClaims".to_string(),
        "SumInsured".to_string(),
    ];

    plot_correlation_matrix(&df, &cols, &PlotStyle::default(), &path).unwrap();

    assert!(path.exists());
}

#[test]
fn test_correlation_matrix_needs_two_columns() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corr_single.png");
    let df = common::create_claims_dataframe();

    plot_correlation_matrix(
        &df,
        &["TotalPremium".to_string()],
        &PlotStyle::default(),
        &path,
    )
    .unwrap();

    assert!(!path.exists());
}

#[test]
fn test_box_plot_written() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("box.png");
    let df = common::create_three_province_dataframe();

    plot_group_distribution(&df, "Province", "TotalClaims", &PlotStyle::default(), &path).unwrap();

    assert!(path.exists());
}

#[test]
fn test_style_can_be_customised() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("small.png");
    let df = common::create_claims_dataframe();
    let style = PlotStyle {
        width: 320,
        height: 200,
        ..PlotStyle::default()
    };

    plot_numerical_distribution(&df, "TotalPremium", &style, &path).unwrap();

    assert!(path.exists());
}
