//! Read-through accessors for the dataset-wide aggregates persisted by the
//! ETL.
//!
//! These are computed over every order at ETL time, so unlike the other
//! metrics they do not reflect any row filter applied to the master table.

use ofa_common::{CategoryRevenue, PaymentTypeTotal, Result};
use ofa_store::{ProcessedStore, TableName};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::aggregate::top_categories;

/// A persisted aggregate that may not have been written yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "rows", rename_all = "snake_case")]
pub enum GlobalAggregate<T> {
    /// The backing file does not exist.
    Missing,
    Present(Vec<T>),
}

impl<T> GlobalAggregate<T> {
    pub fn from_option(rows: Option<Vec<T>>) -> Self {
        rows.map_or(Self::Missing, Self::Present)
    }

    /// Rows, or an empty slice when missing.
    pub fn rows(&self) -> &[T] {
        match self {
            Self::Missing => &[],
            Self::Present(rows) => rows,
        }
    }

    pub fn map<U, F>(self, f: F) -> GlobalAggregate<U>
    where
        F: FnOnce(Vec<T>) -> Vec<U>,
    {
        match self {
            Self::Missing => GlobalAggregate::Missing,
            Self::Present(rows) => GlobalAggregate::Present(f(rows)),
        }
    }
}

impl<T> Default for GlobalAggregate<T> {
    fn default() -> Self {
        Self::Missing
    }
}

/// Column names of a persisted table, known whether or not the file exists.
pub fn aggregate_columns(table: TableName) -> Vec<String> {
    table
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect()
}

/// Paid totals by payment type over the whole dataset.
pub fn payment_breakdown(store: &ProcessedStore) -> Result<GlobalAggregate<PaymentTypeTotal>> {
    let rows = store.read_payment_type_summary()?;
    if rows.is_none() {
        warn!(dir = %store.dir().display(), "payment type summary not found; run the ETL first");
    }
    Ok(GlobalAggregate::from_option(rows))
}

/// The `n` highest-revenue categories over the whole dataset.
pub fn category_revenue(store: &ProcessedStore, n: usize) -> Result<GlobalAggregate<CategoryRevenue>> {
    let rows = store.read_category_revenue()?;
    if rows.is_none() {
        warn!(dir = %store.dir().display(), "category revenue not found; run the ETL first");
    }
    Ok(GlobalAggregate::from_option(rows).map(|rows| top_categories(&rows, n)))
}
