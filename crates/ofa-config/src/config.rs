//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default)]
    pub paths: StoragePaths,

    #[serde(default)]
    pub inputs: InputPrefixes,

    #[serde(default)]
    pub metrics: MetricsDefaults,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            paths: StoragePaths::default(),
            inputs: InputPrefixes::default(),
            metrics: MetricsDefaults::default(),
        }
    }
}

impl Config {
    /// Load from a TOML or JSON file, chosen by extension.
    pub fn from_file(path: &Path) -> Result<Self, crate::ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            other => Err(crate::ConfigError::UnsupportedFormat(
                other.unwrap_or("").to_string(),
            )),
        }
    }
}

/// Storage locations for raw inputs and processed outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoragePaths {
    /// Directory holding the raw CSV exports.
    #[serde(default = "default_raw_dir")]
    pub raw_dir: PathBuf,

    /// Directory the ETL writes Parquet tables into.
    #[serde(default = "default_processed_dir")]
    pub processed_dir: PathBuf,
}

fn default_raw_dir() -> PathBuf {
    PathBuf::from("data/raw")
}

fn default_processed_dir() -> PathBuf {
    PathBuf::from("data/processed")
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            processed_dir: default_processed_dir(),
        }
    }
}

/// File-name prefixes used to locate each raw entity's CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputPrefixes {
    pub orders: String,
    pub customers: String,
    pub payments: String,
    pub items: String,
    pub products: String,
}

impl Default for InputPrefixes {
    fn default() -> Self {
        Self {
            orders: "olist_orders_dataset".to_string(),
            customers: "olist_customers_dataset".to_string(),
            payments: "olist_order_payments_dataset".to_string(),
            items: "olist_order_items_dataset".to_string(),
            products: "olist_products_dataset".to_string(),
        }
    }
}

impl InputPrefixes {
    /// `(entity, prefix)` pairs in load order.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("orders", self.orders.as_str()),
            ("customers", self.customers.as_str()),
            ("payments", self.payments.as_str()),
            ("items", self.items.as_str()),
            ("products", self.products.as_str()),
        ]
    }
}

/// Default truncation sizes for ranked metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDefaults {
    #[serde(default = "default_top_geo")]
    pub top_geo: usize,

    #[serde(default = "default_top_categories")]
    pub top_categories: usize,
}

fn default_top_geo() -> usize {
    10
}

fn default_top_categories() -> usize {
    15
}

impl Default for MetricsDefaults {
    fn default() -> Self {
        Self {
            top_geo: default_top_geo(),
            top_categories: default_top_categories(),
        }
    }
}
