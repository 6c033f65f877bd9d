//! Statistical test kernels: pooled t-test, one-way ANOVA, chi-squared
//! independence and Tukey HSD post-hoc comparisons.
//!
//! Distribution CDFs come from statrs; the studentized range distribution
//! needed for Tukey HSD is not packaged anywhere, so its survival function is
//! evaluated here by numerical integration.

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, StudentsT};
use statrs::function::erf::erf;
use statrs::function::gamma::ln_gamma;

/// Two-sample t-test outcome.
#[derive(Debug, Clone, Serialize)]
pub struct TTestResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// One-way ANOVA outcome.
#[derive(Debug, Clone, Serialize)]
pub struct AnovaResult {
    pub statistic: f64,
    pub p_value: f64,
}

/// Chi-squared independence test outcome.
#[derive(Debug, Clone, Serialize)]
pub struct ChiSquaredResult {
    pub statistic: f64,
    pub p_value: f64,
    pub dof: usize,
}

/// One Tukey HSD pairwise comparison.
#[derive(Debug, Clone, Serialize)]
pub struct PairwiseComparison {
    pub group_a: String,
    pub group_b: String,
    pub mean_diff: f64,
    pub p_adj: f64,
    pub reject: bool,
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

fn sum_sq_dev(data: &[f64], center: f64) -> f64 {
    data.iter().map(|x| (x - center) * (x - center)).sum()
}

/// Student's two-sample t-test assuming equal variances (pooled).
pub fn two_sample_t_test(a: &[f64], b: &[f64]) -> TTestResult {
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let df = n1 + n2 - 2.0;
    if df < 1.0 {
        return TTestResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
        };
    }

    let (m1, m2) = (mean(a), mean(b));
    let pooled_var = (sum_sq_dev(a, m1) + sum_sq_dev(b, m2)) / df;
    let se = (pooled_var * (1.0 / n1 + 1.0 / n2)).sqrt();
    if se == 0.0 {
        return TTestResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
        };
    }

    let t = (m1 - m2) / se;
    let p_value = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    };

    TTestResult {
        statistic: t,
        p_value,
    }
}

/// One-way ANOVA F-test across two or more groups.
pub fn one_way_anova(groups: &[Vec<f64>]) -> AnovaResult {
    let k = groups.len();
    let n: usize = groups.iter().map(|g| g.len()).sum();
    let df_between = k.saturating_sub(1);
    let df_within = n.saturating_sub(k);
    if df_between == 0 || df_within == 0 {
        return AnovaResult {
            statistic: f64::NAN,
            p_value: f64::NAN,
        };
    }

    let grand_mean = groups.iter().flatten().sum::<f64>() / n as f64;
    let ss_between: f64 = groups
        .iter()
        .map(|g| {
            let m = mean(g);
            g.len() as f64 * (m - grand_mean) * (m - grand_mean)
        })
        .sum();
    let ss_within: f64 = groups.iter().map(|g| sum_sq_dev(g, mean(g))).sum();

    let ms_within = ss_within / df_within as f64;
    if ms_within == 0.0 {
        return AnovaResult {
            statistic: f64::INFINITY,
            p_value: 0.0,
        };
    }

    let f = (ss_between / df_between as f64) / ms_within;
    let p_value = match FisherSnedecor::new(df_between as f64, df_within as f64) {
        Ok(dist) => 1.0 - dist.cdf(f),
        Err(_) => f64::NAN,
    };

    AnovaResult {
        statistic: f,
        p_value,
    }
}

/// Chi-squared test of independence on an observed contingency table.
///
/// Applies the Yates continuity correction for 2x2 tables (one degree of
/// freedom), matching the classical treatment of small tables.
pub fn chi_squared_independence(observed: &[Vec<f64>]) -> ChiSquaredResult {
    let rows = observed.len();
    let cols = observed.first().map_or(0, |r| r.len());
    let dof = rows.saturating_sub(1) * cols.saturating_sub(1);
    if dof == 0 {
        return ChiSquaredResult {
            statistic: 0.0,
            p_value: 1.0,
            dof,
        };
    }

    let total: f64 = observed.iter().flatten().sum();
    let row_totals: Vec<f64> = observed.iter().map(|r| r.iter().sum()).collect();
    let col_totals: Vec<f64> = (0..cols)
        .map(|j| observed.iter().map(|r| r[j]).sum())
        .collect();

    let correction = dof == 1;
    let mut statistic = 0.0;
    for (i, row) in observed.iter().enumerate() {
        for (j, &obs) in row.iter().enumerate() {
            let expected = row_totals[i] * col_totals[j] / total;
            if expected == 0.0 {
                continue;
            }
            let mut diff = (obs - expected).abs();
            if correction {
                diff = (diff - 0.5).max(0.0);
            }
            statistic += diff * diff / expected;
        }
    }

    let p_value = match ChiSquared::new(dof as f64) {
        Ok(dist) => 1.0 - dist.cdf(statistic),
        Err(_) => f64::NAN,
    };

    ChiSquaredResult {
        statistic,
        p_value,
        dof,
    }
}

/// Tukey HSD pairwise comparisons across labelled groups at significance
/// level `alpha`.
pub fn tukey_hsd(groups: &[(String, Vec<f64>)], alpha: f64) -> Vec<PairwiseComparison> {
    let k = groups.len();
    let n: usize = groups.iter().map(|(_, g)| g.len()).sum();
    let df_within = n.saturating_sub(k);

    let ss_within: f64 = groups.iter().map(|(_, g)| sum_sq_dev(g, mean(g))).sum();
    let mse = if df_within > 0 {
        ss_within / df_within as f64
    } else {
        f64::NAN
    };

    let mut comparisons = Vec::with_capacity(k * (k - 1) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            let (name_a, data_a) = &groups[i];
            let (name_b, data_b) = &groups[j];
            let mean_diff = mean(data_b) - mean(data_a);
            let se = (mse / 2.0 * (1.0 / data_a.len() as f64 + 1.0 / data_b.len() as f64)).sqrt();
            let (p_adj, reject) = if se > 0.0 && df_within > 0 {
                let q = mean_diff.abs() / se;
                let p = studentized_range_sf(q, k as f64, df_within as f64);
                (p, p < alpha)
            } else {
                (f64::NAN, false)
            };
            comparisons.push(PairwiseComparison {
                group_a: name_a.clone(),
                group_b: name_b.clone(),
                mean_diff,
                p_adj,
                reject,
            });
        }
    }

    comparisons
}

fn std_normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

fn std_normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Inner integral of the studentized range CDF for a fixed range width `w`:
/// `k * int phi(z) * [Phi(z) - Phi(z - w)]^(k-1) dz`.
fn range_probability(w: f64, k: f64) -> f64 {
    if w <= 0.0 {
        return 0.0;
    }
    // phi(z) is negligible outside [-8, 8]
    const STEPS: usize = 160;
    let (lo, hi) = (-8.0_f64, 8.0_f64);
    let h = (hi - lo) / STEPS as f64;
    let f = |z: f64| {
        let inner = std_normal_cdf(z) - std_normal_cdf(z - w);
        std_normal_pdf(z) * inner.powf(k - 1.0)
    };
    let mut acc = f(lo) + f(hi);
    for step in 1..STEPS {
        let z = lo + step as f64 * h;
        acc += if step % 2 == 1 { 4.0 } else { 2.0 } * f(z);
    }
    (k * h / 3.0 * acc).clamp(0.0, 1.0)
}

/// Survival function of the studentized range distribution with `k` groups
/// and `df` error degrees of freedom, via Simpson integration over the scale
/// factor `u = sqrt(chi2_df / df)`.
pub fn studentized_range_sf(q: f64, k: f64, df: f64) -> f64 {
    if !q.is_finite() || q <= 0.0 {
        return 1.0;
    }
    // Large df: the scale factor collapses to 1
    if df > 10_000.0 {
        return (1.0 - range_probability(q, k)).clamp(0.0, 1.0);
    }

    // Density of u = sqrt(chi2_df / df)
    let ln_coeff = (1.0 - df / 2.0) * 2f64.ln() + (df / 2.0) * df.ln() - ln_gamma(df / 2.0);
    let density = |u: f64| {
        if u <= 0.0 {
            0.0
        } else {
            (ln_coeff + (df - 1.0) * u.ln() - df * u * u / 2.0).exp()
        }
    };

    const STEPS: usize = 384;
    let (lo, hi) = (0.0_f64, 6.0_f64);
    let h = (hi - lo) / STEPS as f64;
    let f = |u: f64| density(u) * range_probability(q * u, k);
    let mut acc = f(lo) + f(hi);
    for step in 1..STEPS {
        let u = lo + step as f64 * h;
        acc += if step % 2 == 1 { 4.0 } else { 2.0 } * f(u);
    }
    let cdf = (h / 3.0 * acc).clamp(0.0, 1.0);
    (1.0 - cdf).clamp(0.0, 1.0)
}
