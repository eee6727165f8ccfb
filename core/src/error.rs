use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetrixError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Required column missing from {table} table: expected one of {expected}")]
    MissingColumn { table: &'static str, expected: String },

    #[error("Invalid baseline: {baseline} users cannot be used as a percentage denominator")]
    InvalidBaseline { baseline: u64 },

    #[error("Baseline unavailable under the '{policy}' policy")]
    BaselineUnavailable { policy: &'static str },

    #[error("Duplicate value {value} in {table} table after cleaning")]
    DuplicateLevel { table: &'static str, value: u64 },

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("Invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type MetrixResult<T> = Result<T, MetrixError>;
