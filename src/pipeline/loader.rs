//! Dataset loader for the pipe-delimited insurance claims extract

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::{Path, PathBuf};

use crate::error::ClaimsError;
use crate::pipeline::schema::{
    COERCED_NUMERIC_COLUMNS, DATA_PATH_ENV, DEFAULT_DATA_PATH, TRANSACTION_MONTH,
};

/// Resolve the input path: explicit argument, then `DATA_PATH`, then the
/// conventional relative location.
pub fn resolve_data_path(path: Option<&Path>) -> PathBuf {
    match path {
        Some(p) => p.to_path_buf(),
        None => std::env::var(DATA_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH)),
    }
}

/// Load the insurance dataset from a `|`-delimited text file.
///
/// `TransactionMonth` is parsed as a date (unparseable values become null) and
/// the fixed list of premium/claims columns is coerced to Float64, turning
/// invalid values into nulls instead of failing the load.
///
/// Fails with [`ClaimsError::NotFound`] when the file does not exist and with
/// [`ClaimsError::EmptyDataset`] when the parsed frame has zero rows.
pub fn load_dataset(path: Option<&Path>) -> Result<DataFrame> {
    let path = resolve_data_path(path);

    if !path.exists() {
        return Err(ClaimsError::NotFound(path).into());
    }

    let mut df = LazyCsvReader::new(&path)
        .with_separator(b'|')
        .with_has_header(true)
        .with_try_parse_dates(true)
        .with_infer_schema_length(Some(10_000))
        .finish()
        .with_context(|| format!("Failed to parse data file: {}", path.display()))?
        .collect()
        .with_context(|| format!("Failed to load data file: {}", path.display()))?;

    if df.height() == 0 {
        return Err(ClaimsError::EmptyDataset.into());
    }

    coerce_transaction_month(&mut df)?;
    coerce_numeric_columns(&mut df)?;

    Ok(df)
}

/// Ensure `TransactionMonth` carries a date dtype. Schema inference usually
/// handles this already; a leftover string column is cast non-strictly so
/// invalid dates become null.
fn coerce_transaction_month(df: &mut DataFrame) -> Result<()> {
    let needs_cast = df
        .column(TRANSACTION_MONTH)
        .map(|col| col.dtype() == &DataType::String)
        .unwrap_or(false);

    if needs_cast {
        let parsed = df.column(TRANSACTION_MONTH)?.cast(&DataType::Date)?;
        df.with_column(parsed)?;
    }

    Ok(())
}

/// Cast the should-be-numeric columns to Float64, mapping unparseable values
/// to null.
fn coerce_numeric_columns(df: &mut DataFrame) -> Result<()> {
    for name in COERCED_NUMERIC_COLUMNS {
        if let Ok(col) = df.column(name) {
            if col.dtype() != &DataType::Float64 {
                let coerced = col.cast(&DataType::Float64)?;
                df.with_column(coerced)?;
            }
        }
    }
    Ok(())
}
