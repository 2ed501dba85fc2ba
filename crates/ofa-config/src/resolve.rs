//! Configuration resolution.
//!
//! Precedence, highest first: explicit CLI values, environment variables,
//! the config file, built-in defaults. The config file is the one named by
//! `--config` or `OFA_CONFIG`, else `<config_dir>/ofa/config.toml` (or
//! `.json`) when it exists.

use std::path::PathBuf;
use tracing::debug;

use crate::config::Config;
use crate::validate::validate;
use crate::ConfigError;

const ENV_CONFIG: &str = "OFA_CONFIG";
const ENV_RAW_DIR: &str = "OFA_RAW_DIR";
const ENV_PROCESSED_DIR: &str = "OFA_PROCESSED_DIR";
const DIR_NAME: &str = "ofa";

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub raw_dir: Option<PathBuf>,
    pub processed_dir: Option<PathBuf>,
    pub top_geo: Option<usize>,
    pub top_categories: Option<usize>,
}

/// Resolve and validate the configuration using the process environment.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<Config, ConfigError> {
    resolve_config_with(overrides, |key| std::env::var(key).ok())
}

/// Resolve with an explicit environment lookup.
pub fn resolve_config_with<F>(overrides: &ConfigOverrides, env: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let file = overrides
        .config_path
        .clone()
        .or_else(|| env(ENV_CONFIG).map(PathBuf::from))
        .or_else(default_config_file);

    let mut config = match file {
        Some(path) => {
            debug!(path = %path.display(), "loading config file");
            Config::from_file(&path)?
        }
        None => Config::default(),
    };

    if let Some(dir) = env(ENV_RAW_DIR) {
        config.paths.raw_dir = PathBuf::from(dir);
    }
    if let Some(dir) = env(ENV_PROCESSED_DIR) {
        config.paths.processed_dir = PathBuf::from(dir);
    }

    if let Some(dir) = &overrides.raw_dir {
        config.paths.raw_dir = dir.clone();
    }
    if let Some(dir) = &overrides.processed_dir {
        config.paths.processed_dir = dir.clone();
    }
    if let Some(n) = overrides.top_geo {
        config.metrics.top_geo = n;
    }
    if let Some(n) = overrides.top_categories {
        config.metrics.top_categories = n;
    }

    validate(&config)?;
    Ok(config)
}

fn default_config_file() -> Option<PathBuf> {
    let base = dirs::config_dir()?.join(DIR_NAME);
    ["config.toml", "config.json"]
        .into_iter()
        .map(|name| base.join(name))
        .find(|path| path.is_file())
}
