//! Order funnel analytics processed storage.
//!
//! This crate provides:
//! - Arrow schema definitions for the processed tables
//! - Parquet writer and reader for those tables
//! - Path layout of the processed directory

pub mod reader;
pub mod schema;
pub mod store;
pub mod writer;

pub use schema::{
    category_revenue_schema, orders_master_schema, payment_type_summary_schema, TableName,
};
pub use store::ProcessedStore;

use std::path::PathBuf;

/// Schema version written into every Parquet file's key-value metadata.
pub const SCHEMA_VERSION: &str = ofa_common::SCHEMA_VERSION;

/// Errors from processed-table I/O.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("table {table}: missing column '{column}'")]
    MissingColumn { table: TableName, column: String },

    #[error("table {table}: column '{column}' has unexpected type {actual}")]
    ColumnType {
        table: TableName,
        column: String,
        actual: String,
    },

    #[error("table {table}: null in required column '{column}' at row {row}")]
    UnexpectedNull {
        table: TableName,
        column: String,
        row: usize,
    },

    #[error("table {table}: {message}")]
    InvalidValue { table: TableName, message: String },

    #[error("table not found: {}", path.display())]
    NotFound { path: PathBuf },
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<StoreError> for ofa_common::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { path } => ofa_common::Error::TableNotFound { path },
            StoreError::Io { source, .. } => ofa_common::Error::Io(source),
            other => ofa_common::Error::Storage(other.to_string()),
        }
    }
}
