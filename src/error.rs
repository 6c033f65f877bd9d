//! Typed error values for structural failures.
//!
//! Numeric edge cases (zero premium, empty groups, absent modes) never raise;
//! they degrade to null/`"Unknown"`/exclusion inside the pipeline. The variants
//! here cover the hard failures a caller must handle.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised by the loading and analysis pipeline.
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// The input data file does not exist.
    #[error("data file not found at {0}")]
    NotFound(PathBuf),

    /// The file parsed but produced zero rows.
    #[error("loaded dataset is empty")]
    EmptyDataset,

    /// Outlier detection was asked for with a method other than "iqr" or "zscore".
    #[error("unknown outlier method '{0}', expected 'iqr' or 'zscore'")]
    UnknownOutlierMethod(String),

    /// A model name did not match any registry entry.
    #[error("unknown model '{0}', expected one of: {1}")]
    UnknownModel(String, &'static str),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}
