//! Column conventions of the insurance claims dataset.

use chrono::NaiveDate;

/// Columns that must be numeric after loading. Values that fail to parse
/// become null rather than aborting the load.
pub const COERCED_NUMERIC_COLUMNS: &[&str] = &[
    "TotalPremium",
    "TotalClaims",
    "SumInsured",
    "CustomValueEstimate",
    "CalculatedPremiumPerTerm",
];

/// Known numeric columns, used to scope descriptive statistics.
pub const NUMERIC_COLUMNS: &[&str] = &[
    "PolicyID",
    "PostalCode",
    "RegistrationYear",
    "Cylinders",
    "cubiccapacity",
    "kilowatts",
    "NumberOfDoors",
    "CustomValueEstimate",
    "NumberOfVehiclesInFleet",
    "SumInsured",
    "CalculatedPremiumPerTerm",
    "TotalPremium",
    "TotalClaims",
];

/// Known categorical columns, used by the encoder.
pub const CATEGORICAL_COLUMNS: &[&str] = &[
    "IsVATRegistered",
    "Citizenship",
    "LegalType",
    "Title",
    "Language",
    "Bank",
    "AccountType",
    "MaritalStatus",
    "Gender",
    "Country",
    "Province",
    "MainCrestaZone",
    "SubCrestaZone",
    "ItemType",
    "VehicleType",
    "make",
    "Model",
    "bodytype",
    "AlarmImmobiliser",
    "TrackingDevice",
    "NewVehicle",
    "WrittenOff",
    "Rebuilt",
    "Converted",
    "CrossBorder",
    "TermFrequency",
    "ExcessSelected",
    "CoverCategory",
    "CoverType",
    "CoverGroup",
    "Section",
    "Product",
    "StatutoryClass",
    "StatutoryRiskType",
];

/// Date column parsed during loading.
pub const TRANSACTION_MONTH: &str = "TransactionMonth";

/// Premium per transaction row.
pub const TOTAL_PREMIUM: &str = "TotalPremium";

/// Claims per transaction row.
pub const TOTAL_CLAIMS: &str = "TotalClaims";

/// Column name used when a precomputed metric series is attached to a
/// working copy of the dataset for grouping.
pub const TEMP_METRIC_COLUMN: &str = "temp_metric";

/// Derived loss ratio column persisted by [`crate::pipeline::eda::with_loss_ratio`].
pub const LOSS_RATIO_COLUMN: &str = "LossRatio";

/// Distinct-value count above which a categorical column is label-encoded
/// instead of one-hot encoded.
pub const DEFAULT_MAX_CARDINALITY: usize = 50;

/// Fallback input location when neither an explicit path nor `DATA_PATH` is set.
pub const DEFAULT_DATA_PATH: &str = "data/raw/insurance_data.txt";

/// Environment variable overriding the default input location.
pub const DATA_PATH_ENV: &str = "DATA_PATH";

/// Reference date used when deriving `PolicyAge` from `RegistrationYear`.
pub fn policy_age_reference_date() -> NaiveDate {
    // 2025-06-17 is always a valid calendar date
    NaiveDate::from_ymd_opt(2025, 6, 17).unwrap_or_default()
}
