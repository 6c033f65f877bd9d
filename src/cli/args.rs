//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

/// Claimlens - exploratory analysis and statistical testing for insurance claims
#[derive(Parser, Debug)]
#[command(name = "claimlens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input data file (pipe-delimited text).
    /// Falls back to the DATA_PATH environment variable, then data/raw/insurance_data.txt.
    #[arg(short, long, env = "DATA_PATH")]
    pub input: Option<PathBuf>,

    /// Segment columns to hypothesis-test (comma-separated)
    #[arg(short, long, value_delimiter = ',', default_value = "Province")]
    pub group_columns: Vec<String>,

    /// Metric column for the numeric hypothesis tests
    #[arg(short, long, default_value = "TotalClaims")]
    pub metric: String,

    /// Significance level for hypothesis tests
    #[arg(long, default_value = "0.05")]
    pub alpha: f64,

    /// Distinct-value count above which categorical columns are label encoded
    /// instead of one-hot encoded
    #[arg(long, default_value = "50")]
    pub max_cardinality: usize,

    /// Severity (regression) model: LinearRegression, DecisionTree or RandomForest
    #[arg(long, default_value = "RandomForest")]
    pub severity_model: String,

    /// Probability (classification) model: LogisticRegression, DecisionTree or RandomForest
    #[arg(long, default_value = "RandomForest")]
    pub probability_model: String,

    /// Held-out fraction for model evaluation
    #[arg(long, default_value = "0.2")]
    pub test_size: f32,

    /// Seed for the train/test shuffle
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Directory for rendered charts
    #[arg(long, default_value = "notebooks/plots")]
    pub plots_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long, default_value = "false")]
    pub no_plots: bool,

    /// Skip baseline model training
    #[arg(long, default_value = "false")]
    pub skip_models: bool,

    /// Write metrics and test results as JSON to this path
    #[arg(long)]
    pub export: Option<PathBuf>,
}
