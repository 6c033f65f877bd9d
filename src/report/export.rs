//! JSON export of analysis results

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::hypothesis::ClaimMetrics;
use crate::report::summary::TestRecord;

/// Metadata about the analysis run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    /// claimlens version
    pub claimlens_version: String,
    /// Input file path
    pub input_file: String,
    /// Significance level used for the tests
    pub alpha: f64,
}

impl RunMetadata {
    pub fn new(input_file: &Path, alpha: f64) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            claimlens_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.display().to_string(),
            alpha,
        }
    }
}

/// Full export document: run metadata, portfolio metrics and test outcomes.
#[derive(Debug, Serialize)]
pub struct AnalysisExport {
    pub metadata: RunMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<ClaimMetrics>,
    pub tests: Vec<TestRecord>,
}

/// Serialize the export document to pretty-printed JSON on disk.
pub fn write_results(path: &Path, export: &AnalysisExport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(export).context("Failed to serialize results")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    Ok(())
}
