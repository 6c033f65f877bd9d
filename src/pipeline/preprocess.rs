//! Imputation, feature engineering and categorical encoding

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use polars::prelude::*;

use crate::pipeline::schema::{
    policy_age_reference_date, CATEGORICAL_COLUMNS, DEFAULT_MAX_CARDINALITY, TOTAL_CLAIMS,
    TOTAL_PREMIUM,
};
use crate::utils::print_warning;

/// Fill missing values: numeric columns with the column median, string
/// columns with the column mode (`"Unknown"` when every value is missing).
/// Other dtypes (dates, booleans) are left untouched.
pub fn impute_missing(df: DataFrame) -> Result<DataFrame> {
    let mut fills: Vec<Expr> = Vec::new();

    for column in df.get_columns() {
        if column.null_count() == 0 {
            continue;
        }
        let name = column.name().as_str();
        if column.dtype().is_primitive_numeric() {
            let cast = column.cast(&DataType::Float64)?;
            // all-null columns have no median and stay null
            if let Some(median) = cast.f64()?.median() {
                fills.push(col(name).fill_null(lit(median)));
            }
        } else if column.dtype() == &DataType::String {
            let fill = string_mode(column)?.unwrap_or_else(|| "Unknown".to_string());
            fills.push(col(name).fill_null(lit(fill)));
        }
    }

    if fills.is_empty() {
        return Ok(df);
    }
    Ok(df.lazy().with_columns(fills).collect()?)
}

/// Most frequent non-null value; ties break to the lexicographically smallest.
fn string_mode(column: &Column) -> Result<Option<String>> {
    let ca = column.str()?;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in ca.into_iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }
    Ok(counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.to_string()))
}

/// Derive `PolicyAge` (whole years between the reference date and Jan 1 of
/// `RegistrationYear`) and `PremiumToClaimsRatio` (`premium / (claims + 1)`).
///
/// `RegistrationYear` is a plain year number; values outside a plausible
/// calendar range produce a null age.
pub fn engineer_features(mut df: DataFrame) -> Result<DataFrame> {
    let reference = policy_age_reference_date();

    let years = df.column("RegistrationYear")?.cast(&DataType::Float64)?;
    let years = years.f64()?;
    let age: Int64Chunked = years
        .into_iter()
        .map(|year| {
            year.filter(|y| (1800.0..=2500.0).contains(y)).and_then(|y| {
                NaiveDate::from_ymd_opt(y as i32, 1, 1)
                    .map(|anchor| (reference - anchor).num_days() / 365)
            })
        })
        .collect();
    df.with_column(age.with_name("PolicyAge".into()).into_series())?;

    let premium = df.column(TOTAL_PREMIUM)?.cast(&DataType::Float64)?;
    let claims = df.column(TOTAL_CLAIMS)?.cast(&DataType::Float64)?;
    let ratio: Float64Chunked = premium
        .f64()?
        .into_iter()
        .zip(claims.f64()?)
        .map(|(p, c)| match (p, c) {
            (Some(p), Some(c)) => Some(p / (c + 1.0)),
            _ => None,
        })
        .collect();
    df.with_column(ratio.with_name("PremiumToClaimsRatio".into()).into_series())?;

    Ok(df)
}

/// Encode the known categorical columns present in the dataset.
///
/// Columns whose distinct-value count exceeds `max_cardinality` are replaced
/// in place with stable sorted-order integer codes (with a warning); the rest
/// are one-hot encoded with the first category dropped to avoid collinearity,
/// replacing the original column.
pub fn encode_categorical(df: DataFrame, max_cardinality: usize) -> Result<DataFrame> {
    let mut encoded = df;
    let mut high_cardinality: Vec<&str> = Vec::new();

    for name in CATEGORICAL_COLUMNS {
        let Ok(column) = encoded.column(name) else {
            continue;
        };
        // n_unique counts null as a distinct value; cardinality is over
        // actual categories only
        let mut distinct = column.as_materialized_series().n_unique()?;
        if column.null_count() > 0 {
            distinct -= 1;
        }
        if distinct > max_cardinality {
            print_warning(&format!(
                "{name} has {distinct} distinct values (limit {max_cardinality}), using label codes"
            ));
            let codes = label_codes(column)?;
            encoded.with_column(codes.with_name((*name).into()).into_series())?;
            high_cardinality.push(name);
        } else {
            let dummies = encoded.select([*name])?.to_dummies(None, true)?;
            encoded = encoded.drop(name)?;
            encoded.hstack_mut(dummies.get_columns())?;
        }
    }

    if !high_cardinality.is_empty() {
        print_warning(&format!(
            "label-encoded high cardinality columns: {high_cardinality:?}"
        ));
    }

    Ok(encoded)
}

/// Stable integer codes: classes sorted lexicographically, nulls stay null.
fn label_codes(column: &Column) -> Result<UInt32Chunked> {
    let cast = column.cast(&DataType::String)?;
    let ca = cast.str()?;

    let mut classes: Vec<&str> = ca.into_iter().flatten().collect();
    classes.sort_unstable();
    classes.dedup();
    let index: HashMap<&str, u32> = classes
        .iter()
        .enumerate()
        .map(|(i, v)| (*v, i as u32))
        .collect();

    Ok(ca
        .into_iter()
        .map(|v| v.and_then(|v| index.get(v).copied()))
        .collect())
}

/// Full preprocessing pipeline: impute, engineer features, encode.
pub fn preprocess(df: DataFrame) -> Result<DataFrame> {
    let df = impute_missing(df)?;
    let df = engineer_features(df)?;
    encode_categorical(df, DEFAULT_MAX_CARDINALITY)
}
