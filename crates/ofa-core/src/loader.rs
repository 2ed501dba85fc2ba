//! Raw CSV loader.
//!
//! Each raw entity lives in one CSV under the raw directory, found by file-name
//! prefix (`<prefix>*.csv`, first match in lexical order). All five inputs are
//! located before any is parsed, so a missing file fails the run before any
//! work is done.
//!
//! Malformed timestamps and numbers inside an otherwise well-formed record are
//! coerced to absent values; structural CSV errors are fatal.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use ofa_common::{CustomerId, CustomerUniqueId, Error, OrderId, ProductId, Result};
use ofa_config::{Config, InputPrefixes};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, info};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a raw timestamp, accepting date-only values as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

fn non_blank<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// One row of the orders export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderRecord {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    #[serde(default, deserialize_with = "non_blank")]
    pub order_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub order_approved_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub order_estimated_delivery_date: Option<NaiveDateTime>,
}

/// One row of the customers export.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: CustomerId,
    #[serde(default)]
    pub customer_unique_id: Option<CustomerUniqueId>,
    #[serde(default, deserialize_with = "non_blank")]
    pub customer_city: Option<String>,
    #[serde(default, deserialize_with = "non_blank")]
    pub customer_state: Option<String>,
}

/// One payment installment or method applied to an order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentRecord {
    pub order_id: OrderId,
    #[serde(default, deserialize_with = "non_blank")]
    pub payment_type: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub payment_value: Option<f64>,
}

/// One line item of an order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemRecord {
    pub order_id: OrderId,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub order_item_id: Option<u32>,
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub freight_value: Option<f64>,
}

impl ItemRecord {
    /// Price plus freight; absent if either component is.
    pub fn revenue(&self) -> Option<f64> {
        Some(self.price? + self.freight_value?)
    }
}

/// One row of the product catalogue.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRecord {
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "non_blank")]
    pub product_category_name: Option<String>,
}

/// Every raw entity of one ETL run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    pub orders: Vec<OrderRecord>,
    pub customers: Vec<CustomerRecord>,
    pub payments: Vec<PaymentRecord>,
    pub items: Vec<ItemRecord>,
    pub products: Vec<ProductRecord>,
}

/// Parse CSV records with headers from any reader. `path` is used only for
/// error context.
pub fn read_records<T, R>(reader: R, path: &Path) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in csv_reader.deserialize() {
        let record: T = result.map_err(|e| Error::MalformedRecord {
            path: path.to_path_buf(),
            line: e.position().map(|p| p.line()).unwrap_or(0),
            message: e.to_string(),
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Paths of the five raw inputs, resolved up front.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFiles {
    pub orders: PathBuf,
    pub customers: PathBuf,
    pub payments: PathBuf,
    pub items: PathBuf,
    pub products: PathBuf,
}

/// Locates and parses the raw exports of one directory.
#[derive(Debug, Clone)]
pub struct RawLoader {
    dir: PathBuf,
    prefixes: InputPrefixes,
}

impl RawLoader {
    pub fn new(dir: impl Into<PathBuf>, prefixes: InputPrefixes) -> Self {
        Self {
            dir: dir.into(),
            prefixes,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.paths.raw_dir.clone(), config.inputs.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Find `<prefix>*.csv` in the raw directory.
    pub fn locate(&self, entity: &str, prefix: &str) -> Result<PathBuf> {
        let missing = || Error::MissingInput {
            entity: format!("{entity} ({prefix}*.csv)"),
            dir: self.dir.clone(),
        };

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(missing()),
            Err(e) => return Err(Error::Io(e)),
        };

        let mut candidates = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with(prefix) && name.ends_with(".csv") && path.is_file() {
                candidates.push(path);
            }
        }
        candidates.sort();
        let found = candidates.into_iter().next().ok_or_else(missing)?;
        debug!(entity, path = %found.display(), "located raw input");
        Ok(found)
    }

    /// Resolve every input path, failing on the first one that is missing.
    pub fn locate_all(&self) -> Result<InputFiles> {
        let p = &self.prefixes;
        Ok(InputFiles {
            orders: self.locate("orders", &p.orders)?,
            customers: self.locate("customers", &p.customers)?,
            payments: self.locate("payments", &p.payments)?,
            items: self.locate("items", &p.items)?,
            products: self.locate("products", &p.products)?,
        })
    }

    /// Locate and parse all five inputs.
    pub fn load(&self) -> Result<RawDataset> {
        let files = self.locate_all()?;
        let dataset = RawDataset {
            orders: read_file(&files.orders)?,
            customers: read_file(&files.customers)?,
            payments: read_file(&files.payments)?,
            items: read_file(&files.items)?,
            products: read_file(&files.products)?,
        };
        info!(
            orders = dataset.orders.len(),
            customers = dataset.customers.len(),
            payments = dataset.payments.len(),
            items = dataset.items.len(),
            products = dataset.products.len(),
            "raw inputs loaded"
        );
        Ok(dataset)
    }
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    read_records(file, path)
}
