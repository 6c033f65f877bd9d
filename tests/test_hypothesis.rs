//! Integration tests for segment metrics and hypothesis test dispatch

use claimlens::pipeline::{
    claim_metrics, loss_ratio, segment, test_hypothesis, MetricSource, TestOutcome,
    TEMP_METRIC_COLUMN,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_claim_metrics_known_values() {
    let df = common::create_claims_dataframe();
    let metrics = claim_metrics(&df).unwrap();

    assert!((metrics.claim_frequency - 0.5).abs() < 1e-12);
    assert!((metrics.claim_severity - 425.0 / 3.0).abs() < 1e-9);
    assert!((metrics.margin - 265.0).abs() < 1e-9);
}

#[test]
fn test_segment_aggregates_sorted_by_label() {
    let df = common::create_claims_dataframe();
    let segments = segment(&df, "Province").unwrap();

    assert_eq!(segments.height(), 2);
    let provinces: Vec<Option<&str>> = segments
        .column("Province")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(provinces, vec![Some("Gauteng"), Some("Western Cape")]);

    let sums = segments.column("TotalClaims_sum").unwrap();
    let sums = sums.f64().unwrap();
    assert_eq!(sums.get(0), Some(50.0));
    assert_eq!(sums.get(1), Some(375.0));
}

#[test]
fn test_two_groups_dispatch_to_t_test() {
    let df = common::create_claims_dataframe();
    let (outcome, _) = test_hypothesis(
        &df,
        "Province",
        MetricSource::Column("TotalClaims".to_string()),
        false,
        0.05,
    )
    .unwrap();

    assert!(matches!(outcome, TestOutcome::TTest(_)));
}

#[test]
fn test_three_groups_dispatch_to_anova_with_pairwise() {
    let df = common::create_three_province_dataframe();
    let (outcome, _) = test_hypothesis(
        &df,
        "Province",
        MetricSource::Column("TotalClaims".to_string()),
        false,
        0.05,
    )
    .unwrap();

    match outcome {
        TestOutcome::Anova {
            p_value, pairwise, ..
        } => {
            // three clearly separated groups: 3 pairs, strongly significant
            assert_eq!(pairwise.len(), 3);
            assert!(p_value < 0.01, "p = {p_value}");
            assert!(pairwise.iter().all(|c| c.reject));
        }
        other => panic!("expected ANOVA, got {other:?}"),
    }
}

#[test]
fn test_single_group_is_insufficient() {
    let df = df! {
        "Province" => ["Gauteng", "Gauteng", "Gauteng"],
        "TotalClaims" => [1.0f64, 2.0, 3.0],
    }
    .unwrap();

    let (outcome, _) = test_hypothesis(
        &df,
        "Province",
        MetricSource::Column("TotalClaims".to_string()),
        false,
        0.05,
    )
    .unwrap();

    assert!(matches!(outcome, TestOutcome::Insufficient));
    assert_eq!(outcome.p_value(), None);
}

#[test]
fn test_all_null_group_is_excluded() {
    // KwaZulu-Natal has no non-null metric values, so the apparent
    // three-group comparison reduces to a two-group t-test.
    let df = df! {
        "Province" => ["Gauteng", "Gauteng", "KwaZulu-Natal", "KwaZulu-Natal",
                       "Western Cape", "Western Cape"],
        "Metric" => [Some(1.0f64), Some(2.0), None, None, Some(5.0), Some(6.0)],
    }
    .unwrap();

    let (outcome, _) = test_hypothesis(
        &df,
        "Province",
        MetricSource::Column("Metric".to_string()),
        false,
        0.05,
    )
    .unwrap();

    assert!(matches!(outcome, TestOutcome::TTest(_)));
}

#[test]
fn test_series_metric_is_attached_to_working_copy() {
    let df = common::create_claims_dataframe();
    let ratio = loss_ratio(
        df.column("TotalClaims").unwrap(),
        df.column("TotalPremium").unwrap(),
    )
    .unwrap();

    let (outcome, work) = test_hypothesis(
        &df,
        "Province",
        MetricSource::Series(ratio.into_series()),
        false,
        0.05,
    )
    .unwrap();

    assert!(work.column(TEMP_METRIC_COLUMN).is_ok());
    assert!(df.column(TEMP_METRIC_COLUMN).is_err(), "input must stay unchanged");
    assert!(matches!(outcome, TestOutcome::TTest(_)));
}

#[test]
fn test_categorical_dispatches_to_chi_squared() {
    let df = common::create_claims_dataframe();
    let (outcome, _) = test_hypothesis(
        &df,
        "Province",
        MetricSource::Column("TotalClaims".to_string()),
        true,
        0.05,
    )
    .unwrap();

    match outcome {
        TestOutcome::ChiSquared(result) => {
            // 2 provinces x has-claim/no-claim
            assert_eq!(result.dof, 1);
            assert!(result.p_value >= 0.0 && result.p_value <= 1.0);
        }
        other => panic!("expected chi-squared, got {other:?}"),
    }
}
