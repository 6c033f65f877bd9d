//! Descriptive statistics, missing value counts, outlier detection and loss ratio

use anyhow::Result;
use polars::prelude::*;

use crate::error::ClaimsError;
use crate::pipeline::schema::{LOSS_RATIO_COLUMN, NUMERIC_COLUMNS, TOTAL_CLAIMS, TOTAL_PREMIUM};

/// Row labels of the descriptive statistics table, in output order.
pub const STAT_ROWS: &[&str] = &["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Compute per-column descriptive statistics for the known numeric columns
/// present in the dataset.
///
/// The result has one `statistic` label column plus one Float64 column per
/// numeric field; `count` is the non-null count.
pub fn descriptive_stats(df: &DataFrame) -> Result<DataFrame> {
    let available: Vec<&str> = NUMERIC_COLUMNS
        .iter()
        .copied()
        .filter(|name| df.column(name).is_ok())
        .collect();

    let labels: Vec<String> = STAT_ROWS.iter().map(|s| s.to_string()).collect();
    let mut columns: Vec<Column> = Vec::with_capacity(available.len() + 1);
    columns.push(Column::new("statistic".into(), labels));

    for name in &available {
        let cast = df.column(name)?.cast(&DataType::Float64)?;
        let ca = cast.f64()?;
        let count = (ca.len() - ca.null_count()) as f64;
        let values: Vec<Option<f64>> = vec![
            Some(count),
            ca.mean(),
            ca.std(1),
            ca.min(),
            ca.quantile(0.25, QuantileMethod::Linear)?,
            ca.quantile(0.50, QuantileMethod::Linear)?,
            ca.quantile(0.75, QuantileMethod::Linear)?,
            ca.max(),
        ];
        columns.push(Column::new((*name).into(), values));
    }

    Ok(DataFrame::new(columns)?)
}

/// Null count per column, in dataset order.
pub fn missing_counts(df: &DataFrame) -> Vec<(String, u64)> {
    df.get_columns()
        .iter()
        .map(|col| (col.name().to_string(), col.null_count() as u64))
        .collect()
}

/// Flag outliers in a numeric column.
///
/// `method` is `"iqr"` (values outside `[Q1 - t*IQR, Q3 + t*IQR]`) or
/// `"zscore"` (absolute z-score above `t`); anything else fails with
/// [`ClaimsError::UnknownOutlierMethod`]. Null values are never flagged.
pub fn detect_outliers(
    df: &DataFrame,
    column: &str,
    method: &str,
    threshold: f64,
) -> Result<BooleanChunked> {
    let cast = df.column(column)?.cast(&DataType::Float64)?;
    let ca = cast.f64()?;

    let flags: Vec<bool> = match method.to_lowercase().as_str() {
        "iqr" => {
            let q1 = ca.quantile(0.25, QuantileMethod::Linear)?;
            let q3 = ca.quantile(0.75, QuantileMethod::Linear)?;
            match (q1, q3) {
                (Some(q1), Some(q3)) => {
                    let iqr = q3 - q1;
                    let lower = q1 - threshold * iqr;
                    let upper = q3 + threshold * iqr;
                    ca.into_iter()
                        .map(|v| v.is_some_and(|x| x < lower || x > upper))
                        .collect()
                }
                // all-null column: nothing to flag
                _ => vec![false; ca.len()],
            }
        }
        "zscore" => match (ca.mean(), ca.std(1)) {
            (Some(mean), Some(std)) if std > 0.0 => ca
                .into_iter()
                .map(|v| v.is_some_and(|x| ((x - mean) / std).abs() > threshold))
                .collect(),
            _ => vec![false; ca.len()],
        },
        _ => return Err(ClaimsError::UnknownOutlierMethod(method.to_string()).into()),
    };

    Ok(BooleanChunked::from_slice("outlier".into(), &flags))
}

/// Elementwise `claims / premium`, with null wherever the premium is exactly
/// zero or either input is null. Zero premiums map to null rather than
/// infinity so downstream aggregation stays bounded.
pub fn loss_ratio(claims: &Column, premium: &Column) -> Result<Float64Chunked> {
    let claims = claims.cast(&DataType::Float64)?;
    let premium = premium.cast(&DataType::Float64)?;
    let claims = claims.f64()?;
    let premium = premium.f64()?;

    let ratio: Float64Chunked = claims
        .into_iter()
        .zip(premium)
        .map(|(c, p)| match (c, p) {
            (Some(c), Some(p)) if p != 0.0 => Some(c / p),
            _ => None,
        })
        .collect();

    Ok(ratio.with_name(LOSS_RATIO_COLUMN.into()))
}

/// Attach a persisted `LossRatio` column so chart and segmentation callers can
/// reference it by name.
pub fn with_loss_ratio(mut df: DataFrame) -> Result<DataFrame> {
    let ratio = loss_ratio(df.column(TOTAL_CLAIMS)?, df.column(TOTAL_PREMIUM)?)?;
    df.with_column(ratio.into_series())?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df! {
            "TotalPremium" => [Some(100.0f64), Some(0.0), Some(300.0), None],
            "TotalClaims" => [50.0f64, 20.0, 150.0, 100.0],
        }
        .unwrap()
    }

    #[test]
    fn count_excludes_nulls() {
        let stats = descriptive_stats(&sample()).unwrap();
        let premium = stats.column("TotalPremium").unwrap().f64().unwrap();
        // row 0 is "count"
        assert_eq!(premium.get(0), Some(3.0));
    }

    #[test]
    fn loss_ratio_zero_premium_is_null() {
        let df = sample();
        let ratio = loss_ratio(
            df.column("TotalClaims").unwrap(),
            df.column("TotalPremium").unwrap(),
        )
        .unwrap();
        assert_eq!(ratio.get(0), Some(0.5));
        assert_eq!(ratio.get(1), None);
        assert_eq!(ratio.get(2), Some(0.5));
        assert_eq!(ratio.get(3), None);
    }

    #[test]
    fn unknown_outlier_method_is_rejected() {
        let err = detect_outliers(&sample(), "TotalClaims", "mad", 1.5).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClaimsError>(),
            Some(ClaimsError::UnknownOutlierMethod(_))
        ));
    }
}
