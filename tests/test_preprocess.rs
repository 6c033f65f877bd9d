//! Integration tests for imputation, feature engineering and encoding

use claimlens::pipeline::{encode_categorical, engineer_features, impute_missing};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_numeric_imputed_with_median() {
    let df = df! {
        "SumInsured" => [Some(1.0f64), None, Some(3.0), Some(5.0)],
    }
    .unwrap();

    let df = impute_missing(df).unwrap();
    let values = df.column("SumInsured").unwrap();

    assert_eq!(values.null_count(), 0);
    assert_eq!(values.f64().unwrap().get(1), Some(3.0));
}

#[test]
fn test_string_imputed_with_mode() {
    let df = df! {
        "Gender" => [Some("Male"), Some("Male"), Some("Female"), None],
    }
    .unwrap();

    let df = impute_missing(df).unwrap();
    let values = df.column("Gender").unwrap();

    assert_eq!(values.null_count(), 0);
    assert_eq!(values.str().unwrap().get(3), Some("Male"));
}

#[test]
fn test_mode_tie_breaks_lexicographically() {
    let df = df! {
        "Gender" => [Some("b"), Some("a"), None],
    }
    .unwrap();

    let df = impute_missing(df).unwrap();
    assert_eq!(df.column("Gender").unwrap().str().unwrap().get(2), Some("a"));
}

#[test]
fn test_all_null_string_gets_unknown() {
    let df = df! {
        "Gender" => [None::<&str>, None, None],
    }
    .unwrap();

    let df = impute_missing(df).unwrap();
    assert_eq!(
        df.column("Gender").unwrap().str().unwrap().get(0),
        Some("Unknown")
    );
}

#[test]
fn test_all_null_numeric_stays_null() {
    let df = df! {
        "SumInsured" => [None::<f64>, None, None],
    }
    .unwrap();

    let df = impute_missing(df).unwrap();
    assert_eq!(df.column("SumInsured").unwrap().null_count(), 3);
}

#[test]
fn test_policy_age_from_registration_year() {
    let df = df! {
        "RegistrationYear" => [Some(2015i64), Some(2020), Some(1700), None],
        "TotalPremium" => [100.0f64, 200.0, 300.0, 400.0],
        "TotalClaims" => [0.0f64, 50.0, 0.0, 25.0],
    }
    .unwrap();

    let df = engineer_features(df).unwrap();
    let age = df.column("PolicyAge").unwrap();
    let age = age.i64().unwrap();

    // whole years between Jan 1 of the registration year and mid-2025
    assert_eq!(age.get(0), Some(10));
    assert_eq!(age.get(1), Some(5));
    assert_eq!(age.get(2), None, "implausible year must not produce an age");
    assert_eq!(age.get(3), None);
}

#[test]
fn test_premium_to_claims_ratio() {
    let df = df! {
        "RegistrationYear" => [2015i64, 2016],
        "TotalPremium" => [100.0f64, 200.0],
        "TotalClaims" => [0.0f64, 300.0],
    }
    .unwrap();

    let df = engineer_features(df).unwrap();
    let ratio = df.column("PremiumToClaimsRatio").unwrap();
    let ratio = ratio.f64().unwrap();

    // claims + 1 in the denominator keeps zero-claim rows finite
    assert_eq!(ratio.get(0), Some(100.0));
    assert!((ratio.get(1).unwrap() - 200.0 / 301.0).abs() < 1e-12);
}

#[test]
fn test_low_cardinality_one_hot_encoding() {
    let df = df! {
        "Gender" => ["Male", "Female", "Male", "Female"],
        "TotalClaims" => [1.0f64, 2.0, 3.0, 4.0],
    }
    .unwrap();

    let encoded = encode_categorical(df, 50).unwrap();

    assert!(encoded.column("Gender").is_err(), "original column replaced");
    let dummy_count = encoded
        .get_column_names()
        .iter()
        .filter(|name| name.starts_with("Gender_"))
        .count();
    // two categories, first dropped
    assert_eq!(dummy_count, 1);
}

#[test]
fn test_nulls_do_not_count_toward_cardinality() {
    // two real categories plus nulls, at a limit of exactly two:
    // must still one-hot encode, not fall back to label codes
    let df = df! {
        "Gender" => [Some("Male"), Some("Female"), None, Some("Male")],
    }
    .unwrap();

    let encoded = encode_categorical(df, 2).unwrap();

    assert!(encoded.column("Gender").is_err(), "original column replaced");
    assert!(encoded
        .get_column_names()
        .iter()
        .any(|name| name.starts_with("Gender_")));
}

#[test]
fn test_high_cardinality_label_codes() {
    let df = df! {
        "Gender" => [Some("Male"), Some("Female"), Some("Male"), None],
    }
    .unwrap();

    let encoded = encode_categorical(df, 1).unwrap();
    let codes = encoded.column("Gender").unwrap();

    assert_eq!(codes.dtype(), &DataType::UInt32);
    let codes = codes.u32().unwrap();
    // classes sorted lexicographically: Female = 0, Male = 1
    assert_eq!(codes.get(0), Some(1));
    assert_eq!(codes.get(1), Some(0));
    assert_eq!(codes.get(3), None);
}
