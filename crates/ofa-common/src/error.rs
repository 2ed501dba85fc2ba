//! Error types for order funnel analytics.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for order funnel analytics operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for order funnel analytics.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    // Input errors (20-29)
    #[error("missing input '{entity}': no matching CSV in {}", dir.display())]
    MissingInput { entity: String, dir: PathBuf },

    #[error("malformed record in {} at line {line}: {message}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("invalid {field} value: {value}")]
    InvalidValue { field: &'static str, value: String },

    // Storage errors (30-39)
    #[error("storage error: {0}")]
    Storage(String),

    #[error("processed table not found: {}", path.display())]
    TableNotFound { path: PathBuf },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::MissingInput { .. } => 20,
            Error::MalformedRecord { .. } => 21,
            Error::InvalidValue { .. } => 22,
            Error::Storage(_) => 30,
            Error::TableNotFound { .. } => 31,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
