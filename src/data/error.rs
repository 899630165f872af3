use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while turning a source file into a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing delimited text")]
    Csv(#[from] csv::Error),

    #[error("parsing JSON")]
    Json(#[from] serde_json::Error),

    #[error("reading parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding arrow record batch")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("expected a top-level JSON array of objects")]
    NotRecords,

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}, column '{column}': negative value {value}")]
    NegativeValue {
        row: usize,
        column: String,
        value: f64,
    },

    #[error("ranking snapshot for {0} is already loaded")]
    DuplicateYear(String),
}
