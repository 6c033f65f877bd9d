//! End-to-end test: raw pipe-delimited file through to a trained baseline

use claimlens::pipeline::{
    claim_metrics, design_matrix, feature_columns, load_dataset, preprocess, split,
    test_hypothesis, train_evaluate_probability, with_loss_ratio, MetricSource, ProbabilityModel,
    TestOutcome,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_full_pipeline_from_raw_file() {
    let mut lines: Vec<String> =
        vec!["PolicyID|Province|Gender|RegistrationYear|TotalPremium|TotalClaims".to_string()];
    for i in 0..24 {
        let province = if i % 2 == 0 { "Gauteng" } else { "Western Cape" };
        let gender = if i % 3 == 0 { "Female" } else { "Male" };
        let claims = if i % 2 == 0 { 0.0 } else { 25.0 + i as f64 };
        lines.push(format!(
            "{}|{}|{}|{}|{:.2}|{:.2}",
            i + 1,
            province,
            gender,
            2010 + (i % 10),
            100.0 + i as f64,
            claims
        ));
    }
    let line_refs: Vec<&str> = lines.iter().map(|s| s.as_str()).collect();
    let (_dir, path) = common::write_pipe_file(&line_refs);

    let df = load_dataset(Some(&path)).unwrap();
    assert_eq!(df.height(), 24);

    let df = with_loss_ratio(df).unwrap();
    let metrics = claim_metrics(&df).unwrap();
    assert!((metrics.claim_frequency - 0.5).abs() < 1e-12);

    let (outcome, _) = test_hypothesis(
        &df,
        "Province",
        MetricSource::Column("TotalClaims".to_string()),
        false,
        0.05,
    )
    .unwrap();
    assert!(matches!(outcome, TestOutcome::TTest(_)));

    let processed = preprocess(df).unwrap();
    assert!(processed.column("PolicyAge").is_ok());
    assert!(processed.column("PremiumToClaimsRatio").is_ok());
    assert!(
        processed.column("Province").is_err(),
        "categoricals must be encoded away"
    );

    let features = feature_columns(
        &processed,
        &["TotalClaims", "LossRatio", "PremiumToClaimsRatio"],
    );
    assert!(!features.is_empty());

    let x = design_matrix(&processed, &features).unwrap();
    let y: Vec<i64> = processed
        .column("TotalClaims")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .map(|c| i64::from(c.is_some_and(|c| c > 0.0)))
        .collect();

    let (x_train, x_test, y_train, y_test) = split(&x, &y, 0.25, 42);
    let (report, _fitted) = train_evaluate_probability(
        ProbabilityModel::DecisionTree,
        &x_train,
        &x_test,
        &y_train,
        &y_test,
    )
    .unwrap();

    assert!((0.0..=1.0).contains(&report.accuracy));
    assert!((0.0..=1.0).contains(&report.f1));
}
