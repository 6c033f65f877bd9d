//! Segment-level metrics and hypothesis test dispatch

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::schema::{TEMP_METRIC_COLUMN, TOTAL_CLAIMS, TOTAL_PREMIUM};
use crate::pipeline::stats::{
    chi_squared_independence, one_way_anova, tukey_hsd, two_sample_t_test, ChiSquaredResult,
    PairwiseComparison, TTestResult,
};

/// Portfolio-level claim metrics.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimMetrics {
    /// Fraction of rows with claims greater than zero.
    pub claim_frequency: f64,
    /// Mean claims over rows with claims greater than zero (NaN if none).
    pub claim_severity: f64,
    /// Total premium minus total claims.
    pub margin: f64,
}

/// Where the metric under test comes from: an existing dataset column or a
/// precomputed series attached under a temporary name.
#[derive(Debug, Clone)]
pub enum MetricSource {
    Column(String),
    Series(Series),
}

impl MetricSource {
    /// Resolve to a (working copy, metric column name) pair. A series is
    /// attached so subsequent grouping can reference it by name.
    fn attach(self, df: &DataFrame) -> Result<(DataFrame, String)> {
        match self {
            MetricSource::Column(name) => Ok((df.clone(), name)),
            MetricSource::Series(series) => {
                let mut work = df.clone();
                work.with_column(series.with_name(TEMP_METRIC_COLUMN.into()))?;
                Ok((work, TEMP_METRIC_COLUMN.to_string()))
            }
        }
    }
}

/// Outcome of [`test_hypothesis`], tagged by which test ran.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "test", rename_all = "snake_case")]
pub enum TestOutcome {
    ChiSquared(ChiSquaredResult),
    TTest(TTestResult),
    Anova {
        statistic: f64,
        p_value: f64,
        pairwise: Vec<PairwiseComparison>,
    },
    /// Fewer than two non-empty groups: no test was performed.
    Insufficient,
}

impl TestOutcome {
    pub fn p_value(&self) -> Option<f64> {
        match self {
            TestOutcome::ChiSquared(r) => Some(r.p_value),
            TestOutcome::TTest(r) => Some(r.p_value),
            TestOutcome::Anova { p_value, .. } => Some(*p_value),
            TestOutcome::Insufficient => None,
        }
    }
}

/// Compute claim frequency, severity and margin over the whole dataset.
pub fn claim_metrics(df: &DataFrame) -> Result<ClaimMetrics> {
    let claims = df.column(TOTAL_CLAIMS)?.cast(&DataType::Float64)?;
    let claims = claims.f64()?;
    let premium = df.column(TOTAL_PREMIUM)?.cast(&DataType::Float64)?;
    let premium = premium.f64()?;

    let rows = claims.len() as f64;
    let positive: Vec<f64> = claims.into_iter().flatten().filter(|c| *c > 0.0).collect();

    let claim_frequency = if rows > 0.0 {
        positive.len() as f64 / rows
    } else {
        f64::NAN
    };
    let claim_severity = if positive.is_empty() {
        f64::NAN
    } else {
        positive.iter().sum::<f64>() / positive.len() as f64
    };
    let margin = premium.sum().unwrap_or(0.0) - claims.sum().unwrap_or(0.0);

    Ok(ClaimMetrics {
        claim_frequency,
        claim_severity,
        margin,
    })
}

/// Aggregate claims and premium per distinct value of `column`:
/// claims mean/count/sum and premium mean/sum, sorted by segment.
pub fn segment(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let out = df
        .clone()
        .lazy()
        .group_by([col(column)])
        .agg([
            col(TOTAL_CLAIMS).mean().alias("TotalClaims_mean"),
            col(TOTAL_CLAIMS).count().alias("TotalClaims_count"),
            col(TOTAL_CLAIMS).sum().alias("TotalClaims_sum"),
            col(TOTAL_PREMIUM).mean().alias("TotalPremium_mean"),
            col(TOTAL_PREMIUM).sum().alias("TotalPremium_sum"),
        ])
        .sort([column], SortMultipleOptions::default())
        .collect()?;
    Ok(out)
}

/// Run the appropriate test of `metric` across the groups of `group_col`.
///
/// Dispatch:
/// - `categorical`: chi-squared independence of group vs "has any claim".
/// - otherwise, exactly 2 non-empty groups: pooled two-sample t-test.
/// - otherwise, more than 2: one-way ANOVA plus Tukey HSD pairwise at `alpha`.
/// - fewer than 2 non-empty groups: [`TestOutcome::Insufficient`].
///
/// A group is excluded entirely when it has no non-null metric values, which
/// can silently reduce an apparent k-group comparison to a 2-group test.
/// Returns the outcome together with the working copy of the dataset (which
/// carries the attached series when one was supplied).
pub fn test_hypothesis(
    df: &DataFrame,
    group_col: &str,
    metric: MetricSource,
    categorical: bool,
    alpha: f64,
) -> Result<(TestOutcome, DataFrame)> {
    let (work, metric_col) = metric.attach(df)?;

    if categorical {
        let outcome = chi_squared_outcome(&work, group_col)?;
        return Ok((outcome, work));
    }

    let groups = collect_groups(&work, group_col, &metric_col)?;
    let outcome = match groups.len() {
        0 | 1 => TestOutcome::Insufficient,
        2 => TestOutcome::TTest(two_sample_t_test(&groups[0].1, &groups[1].1)),
        _ => {
            let data: Vec<Vec<f64>> = groups.iter().map(|(_, v)| v.clone()).collect();
            let anova = one_way_anova(&data);
            TestOutcome::Anova {
                statistic: anova.statistic,
                p_value: anova.p_value,
                pairwise: tukey_hsd(&groups, alpha),
            }
        }
    };

    Ok((outcome, work))
}

/// Per-group non-null metric values, keyed and ordered by group label.
/// Rows with a null group key or null metric are dropped, so a group whose
/// metric is entirely null never appears.
fn collect_groups(
    df: &DataFrame,
    group_col: &str,
    metric_col: &str,
) -> Result<Vec<(String, Vec<f64>)>> {
    let keys = df.column(group_col)?.cast(&DataType::String)?;
    let keys = keys.str()?;
    let values = df.column(metric_col)?.cast(&DataType::Float64)?;
    let values = values.f64()?;

    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        if let (Some(key), Some(value)) = (key, value) {
            grouped.entry(key.to_string()).or_default().push(value);
        }
    }

    Ok(grouped.into_iter().collect())
}

/// Build the group x "has any claim" contingency table and run the
/// chi-squared independence test on it.
fn chi_squared_outcome(df: &DataFrame, group_col: &str) -> Result<TestOutcome> {
    let keys = df.column(group_col)?.cast(&DataType::String)?;
    let keys = keys.str()?;
    let claims = df.column(TOTAL_CLAIMS)?.cast(&DataType::Float64)?;
    let claims = claims.f64()?;

    let mut counts: BTreeMap<String, [f64; 2]> = BTreeMap::new();
    for (key, claim) in keys.into_iter().zip(claims) {
        if let Some(key) = key {
            let has_claim = claim.is_some_and(|c| c > 0.0);
            counts.entry(key.to_string()).or_default()[usize::from(has_claim)] += 1.0;
        }
    }

    let observed: Vec<Vec<f64>> = counts.values().map(|row| row.to_vec()).collect();
    Ok(TestOutcome::ChiSquared(chi_squared_independence(&observed)))
}
