//! Order funnel analytics configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the pipeline configuration
//! - Config resolution (CLI → env → config file → defaults)
//! - Semantic validation

pub mod config;
pub mod resolve;
pub mod validate;

pub use config::{Config, InputPrefixes, MetricsDefaults, StoragePaths};
pub use resolve::{resolve_config, ConfigOverrides};
pub use validate::{validate, ValidationError};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Errors from configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported config file extension: {0}")]
    UnsupportedFormat(String),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

impl From<ConfigError> for ofa_common::Error {
    fn from(err: ConfigError) -> Self {
        ofa_common::Error::Config(err.to_string())
    }
}
