//! Integration tests for descriptive statistics, outliers and loss ratio

use claimlens::pipeline::{
    descriptive_stats, detect_outliers, missing_counts, with_loss_ratio, STAT_ROWS,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_descriptive_stats_shape_and_values() {
    let df = common::create_claims_dataframe();
    let stats = descriptive_stats(&df).unwrap();

    assert_eq!(stats.height(), STAT_ROWS.len());
    let labels: Vec<Option<&str>> = stats
        .column("statistic")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(labels[0], Some("count"));
    assert_eq!(labels[7], Some("max"));

    // TotalPremium: [100, 120, 90, 200, 180, 0]
    let premium = stats.column("TotalPremium").unwrap();
    let premium = premium.f64().unwrap();
    assert_eq!(premium.get(0), Some(6.0)); // count
    assert_eq!(premium.get(1), Some(115.0)); // mean
    assert_eq!(premium.get(3), Some(0.0)); // min
    assert_eq!(premium.get(5), Some(110.0)); // median
    assert_eq!(premium.get(7), Some(200.0)); // max
}

#[test]
fn test_count_excludes_nulls() {
    let df = common::create_claims_dataframe();
    let stats = descriptive_stats(&df).unwrap();

    // SumInsured has one null out of six
    let sum_insured = stats.column("SumInsured").unwrap();
    assert_eq!(sum_insured.f64().unwrap().get(0), Some(5.0));
}

#[test]
fn test_missing_counts_per_column() {
    let df = common::create_claims_dataframe();
    let missing = missing_counts(&df);

    let lookup = |name: &str| {
        missing
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, count)| *count)
            .unwrap()
    };
    assert_eq!(lookup("Province"), 0);
    assert_eq!(lookup("Gender"), 1);
    assert_eq!(lookup("SumInsured"), 1);
}

#[test]
fn test_iqr_flags_extreme_value() {
    let df = df! {
        "TotalClaims" => [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 100.0],
    }
    .unwrap();

    let flags = detect_outliers(&df, "TotalClaims", "iqr", 1.5).unwrap();

    assert_eq!(flags.sum(), Some(1));
    assert_eq!(flags.get(10), Some(true));
}

#[test]
fn test_zscore_constant_column_has_no_outliers() {
    let df = df! {
        "TotalClaims" => [5.0f64; 20],
    }
    .unwrap();

    let flags = detect_outliers(&df, "TotalClaims", "zscore", 3.0).unwrap();
    assert_eq!(flags.sum(), Some(0));
}

#[test]
fn test_nulls_are_never_flagged() {
    let df = df! {
        "TotalClaims" => [Some(1.0f64), Some(2.0), None, Some(3.0), Some(1000.0)],
    }
    .unwrap();

    let flags = detect_outliers(&df, "TotalClaims", "zscore", 1.0).unwrap();
    assert_eq!(flags.get(2), Some(false));
}

#[test]
fn test_with_loss_ratio_persists_column() {
    let df = common::create_claims_dataframe();
    let df = with_loss_ratio(df).unwrap();

    let ratio = df.column("LossRatio").unwrap();
    let ratio = ratio.f64().unwrap();
    assert_eq!(ratio.get(0), Some(0.0)); // 0 / 100
    assert!((ratio.get(1).unwrap() - 50.0 / 120.0).abs() < 1e-12);
    assert_eq!(ratio.get(5), None); // zero premium
}
