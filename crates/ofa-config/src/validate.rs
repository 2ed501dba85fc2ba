//! Semantic validation of a resolved configuration.

use crate::config::Config;

/// A configuration that parsed but cannot drive a run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("input prefix for {entity} is empty")]
    EmptyPrefix { entity: &'static str },

    #[error("{field} must be at least 1")]
    ZeroLimit { field: &'static str },

    #[error("raw and processed directories must differ: {0}")]
    SharedDirectory(String),

    #[error("incompatible config schema version: {0}")]
    SchemaVersion(String),
}

/// Validate a configuration, returning the first problem found.
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    if !ofa_common::schema::is_compatible(&config.schema_version) {
        return Err(ValidationError::SchemaVersion(config.schema_version.clone()));
    }

    for (entity, prefix) in config.inputs.entries() {
        if prefix.trim().is_empty() {
            return Err(ValidationError::EmptyPrefix { entity });
        }
    }

    if config.metrics.top_geo == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "metrics.top_geo",
        });
    }
    if config.metrics.top_categories == 0 {
        return Err(ValidationError::ZeroLimit {
            field: "metrics.top_categories",
        });
    }

    if config.paths.raw_dir == config.paths.processed_dir {
        return Err(ValidationError::SharedDirectory(
            config.paths.raw_dir.display().to_string(),
        ));
    }

    Ok(())
}
