//! Baseline severity (regression) and probability (classification) models

use std::str::FromStr;

use anyhow::{anyhow, Result};
use polars::prelude::*;
use serde::Serialize;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use smartcore::linear::logistic_regression::{LogisticRegression, LogisticRegressionParameters};
use smartcore::metrics::{f1, mean_squared_error, precision, r2, recall};
use smartcore::model_selection::train_test_split;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters,
};
use smartcore::tree::decision_tree_regressor::{
    DecisionTreeRegressor, DecisionTreeRegressorParameters,
};

use crate::error::ClaimsError;

/// Deterministic seed shared by all seeded models.
const MODEL_SEED: u64 = 42;

/// Claim severity (regression) model registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SeverityModel {
    LinearRegression,
    DecisionTree,
    RandomForest,
}

impl FromStr for SeverityModel {
    type Err = ClaimsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LinearRegression" => Ok(Self::LinearRegression),
            "DecisionTree" => Ok(Self::DecisionTree),
            "RandomForest" => Ok(Self::RandomForest),
            other => Err(ClaimsError::UnknownModel(
                other.to_string(),
                "LinearRegression, DecisionTree, RandomForest",
            )),
        }
    }
}

/// Claim probability (classification) model registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProbabilityModel {
    LogisticRegression,
    DecisionTree,
    RandomForest,
}

impl FromStr for ProbabilityModel {
    type Err = ClaimsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LogisticRegression" => Ok(Self::LogisticRegression),
            "DecisionTree" => Ok(Self::DecisionTree),
            "RandomForest" => Ok(Self::RandomForest),
            other => Err(ClaimsError::UnknownModel(
                other.to_string(),
                "LogisticRegression, DecisionTree, RandomForest",
            )),
        }
    }
}

/// Regression evaluation scores.
#[derive(Debug, Clone, Serialize)]
pub struct SeverityReport {
    pub rmse: f64,
    pub r2: f64,
}

/// Classification evaluation scores.
#[derive(Debug, Clone, Serialize)]
pub struct ProbabilityReport {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// A fitted regression model, kept for further prediction.
pub enum FittedSeverity {
    Linear(LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>),
    Tree(DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>),
    Forest(RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>),
}

impl FittedSeverity {
    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<f64>> {
        match self {
            Self::Linear(m) => m.predict(x),
            Self::Tree(m) => m.predict(x),
            Self::Forest(m) => m.predict(x),
        }
        .map_err(|e| anyhow!("prediction failed: {e}"))
    }
}

/// A fitted classification model, kept for further prediction.
pub enum FittedProbability {
    Logistic(LogisticRegression<f64, i64, DenseMatrix<f64>, Vec<i64>>),
    Tree(DecisionTreeClassifier<f64, i64, DenseMatrix<f64>, Vec<i64>>),
    Forest(RandomForestClassifier<f64, i64, DenseMatrix<f64>, Vec<i64>>),
}

impl FittedProbability {
    pub fn predict(&self, x: &DenseMatrix<f64>) -> Result<Vec<i64>> {
        match self {
            Self::Logistic(m) => m.predict(x),
            Self::Tree(m) => m.predict(x),
            Self::Forest(m) => m.predict(x),
        }
        .map_err(|e| anyhow!("prediction failed: {e}"))
    }
}

/// Train the chosen severity model and score it on the held-out split.
pub fn train_evaluate_severity(
    model: SeverityModel,
    x_train: &DenseMatrix<f64>,
    x_test: &DenseMatrix<f64>,
    y_train: &[f64],
    y_test: &[f64],
) -> Result<(SeverityReport, FittedSeverity)> {
    let y_train = y_train.to_vec();
    let fitted = match model {
        SeverityModel::LinearRegression => FittedSeverity::Linear(
            LinearRegression::fit(x_train, &y_train, LinearRegressionParameters::default())
                .map_err(|e| anyhow!("linear regression training failed: {e}"))?,
        ),
        SeverityModel::DecisionTree => FittedSeverity::Tree(
            DecisionTreeRegressor::fit(
                x_train,
                &y_train,
                DecisionTreeRegressorParameters::default(),
            )
            .map_err(|e| anyhow!("decision tree training failed: {e}"))?,
        ),
        SeverityModel::RandomForest => FittedSeverity::Forest(
            RandomForestRegressor::fit(
                x_train,
                &y_train,
                RandomForestRegressorParameters::default().with_seed(MODEL_SEED),
            )
            .map_err(|e| anyhow!("random forest training failed: {e}"))?,
        ),
    };

    let y_pred = fitted.predict(x_test)?;
    let y_test = y_test.to_vec();
    let report = SeverityReport {
        rmse: mean_squared_error(&y_test, &y_pred).sqrt(),
        r2: r2(&y_test, &y_pred),
    };
    Ok((report, fitted))
}

/// Train the chosen probability model and score it on the held-out split.
pub fn train_evaluate_probability(
    model: ProbabilityModel,
    x_train: &DenseMatrix<f64>,
    x_test: &DenseMatrix<f64>,
    y_train: &[i64],
    y_test: &[i64],
) -> Result<(ProbabilityReport, FittedProbability)> {
    let y_train = y_train.to_vec();
    let fitted = match model {
        ProbabilityModel::LogisticRegression => FittedProbability::Logistic(
            LogisticRegression::fit(x_train, &y_train, LogisticRegressionParameters::default())
                .map_err(|e| anyhow!("logistic regression training failed: {e}"))?,
        ),
        ProbabilityModel::DecisionTree => FittedProbability::Tree(
            DecisionTreeClassifier::fit(
                x_train,
                &y_train,
                DecisionTreeClassifierParameters::default().with_max_depth(5),
            )
            .map_err(|e| anyhow!("decision tree training failed: {e}"))?,
        ),
        ProbabilityModel::RandomForest => FittedProbability::Forest(
            RandomForestClassifier::fit(
                x_train,
                &y_train,
                RandomForestClassifierParameters::default()
                    .with_n_trees(50)
                    .with_max_depth(5)
                    .with_seed(MODEL_SEED),
            )
            .map_err(|e| anyhow!("random forest training failed: {e}"))?,
        ),
    };

    let y_pred = fitted.predict(x_test)?;
    let truth: Vec<f64> = y_test.iter().map(|v| *v as f64).collect();
    let pred: Vec<f64> = y_pred.iter().map(|v| *v as f64).collect();

    let correct = truth
        .iter()
        .zip(pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 0.5)
        .count();
    let report = ProbabilityReport {
        accuracy: correct as f64 / truth.len().max(1) as f64,
        precision: precision(&truth, &pred),
        recall: recall(&truth, &pred),
        f1: f1(&truth, &pred, 1.0),
    };
    Ok((report, fitted))
}

/// Assemble a dense feature matrix from the named columns, casting to Float64.
/// Residual nulls (nothing should survive imputation) become zero.
pub fn design_matrix(df: &DataFrame, feature_cols: &[String]) -> Result<DenseMatrix<f64>> {
    let mut rows: Vec<Vec<f64>> = vec![Vec::with_capacity(feature_cols.len()); df.height()];
    for name in feature_cols {
        let cast = df.column(name)?.cast(&DataType::Float64)?;
        for (row, value) in rows.iter_mut().zip(cast.f64()?) {
            row.push(value.unwrap_or(0.0));
        }
    }
    DenseMatrix::from_2d_vec(&rows).map_err(|e| anyhow!("failed to build feature matrix: {e}"))
}

/// Names of the primitive-numeric columns usable as model features,
/// excluding the targets and derived ratio columns.
pub fn feature_columns(df: &DataFrame, exclude: &[&str]) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric() || col.dtype() == &DataType::Boolean)
        .map(|col| col.name().to_string())
        .filter(|name| !exclude.contains(&name.as_str()))
        .collect()
}

/// Deterministic train/test split (shuffled with a fixed seed).
pub fn split<TY: smartcore::numbers::basenum::Number>(
    x: &DenseMatrix<f64>,
    y: &[TY],
    test_size: f32,
    seed: u64,
) -> (DenseMatrix<f64>, DenseMatrix<f64>, Vec<TY>, Vec<TY>) {
    train_test_split(x, &y.to_vec(), test_size, true, Some(seed))
}
