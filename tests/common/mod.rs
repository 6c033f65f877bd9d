//! Shared test fixtures for the claimlens integration tests

use polars::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

/// Small claims frame with two provinces and a couple of nulls.
///
/// Known facts:
/// - 6 rows, 3 with claims > 0 (claim frequency 0.5)
/// - claim severity (50 + 300 + 75) / 3
/// - total premium 690, total claims 425, margin 265
/// - one null in `Gender` and one in `SumInsured`
/// - one zero premium row (null loss ratio)
pub fn create_claims_dataframe() -> DataFrame {
    df! {
        "Province" => ["Gauteng", "Gauteng", "Gauteng", "Western Cape", "Western Cape", "Western Cape"],
        "Gender" => [Some("Male"), Some("Female"), None, Some("Male"), Some("Female"), Some("Male")],
        "TotalPremium" => [100.0f64, 120.0, 90.0, 200.0, 180.0, 0.0],
        "TotalClaims" => [0.0f64, 50.0, 0.0, 300.0, 0.0, 75.0],
        "SumInsured" => [Some(1000.0f64), Some(1200.0), None, Some(5000.0), Some(4500.0), Some(4800.0)],
        "RegistrationYear" => [2015i64, 2018, 2020, 2010, 2012, 2019],
    }
    .unwrap()
}

/// Nine rows across three provinces, for multi-group tests.
pub fn create_three_province_dataframe() -> DataFrame {
    df! {
        "Province" => ["Gauteng", "Gauteng", "Gauteng",
                       "KwaZulu-Natal", "KwaZulu-Natal", "KwaZulu-Natal",
                       "Western Cape", "Western Cape", "Western Cape"],
        "TotalPremium" => [100.0f64, 110.0, 90.0, 150.0, 160.0, 140.0, 210.0, 190.0, 200.0],
        "TotalClaims" => [10.0f64, 12.0, 8.0, 55.0, 60.0, 50.0, 110.0, 95.0, 105.0],
    }
    .unwrap()
}

/// Write a pipe-delimited text file into a fresh temp directory.
pub fn write_pipe_file(lines: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("insurance_data.txt");

    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    drop(file);

    (temp_dir, path)
}
