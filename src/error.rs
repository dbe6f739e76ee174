use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Missing columns in data: {}. Check the data structure.", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Data not loaded. Please load the data before opening this view.")]
    DataNotLoaded,

    #[error("Invalid value in column '{column}' at line {line}: {reason}")]
    InvalidRecord {
        line: u64,
        column: String,
        reason: String,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
