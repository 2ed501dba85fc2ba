//! Batch ETL: raw CSV exports in, processed Parquet tables out.
//!
//! The run is all-or-nothing up to the write step: every input is located
//! and parsed before anything is written, and each table is written to a
//! temporary file and renamed into place.

use std::path::PathBuf;
use std::time::Instant;

use ofa_common::{CategoryRevenue, PaymentTypeTotal, Result, RunId};
use ofa_config::Config;
use ofa_store::ProcessedStore;
use serde::{Deserialize, Serialize};
use tracing::{info, info_span};

use crate::aggregate::{category_revenue, payment_type_summary};
use crate::loader::{RawDataset, RawLoader};
use crate::master::MasterTable;

/// Everything the ETL derives from one raw dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct EtlOutput {
    pub master: MasterTable,
    pub payment_summary: Vec<PaymentTypeTotal>,
    pub category_revenue: Vec<CategoryRevenue>,
}

/// Derive the processed tables without touching the filesystem.
pub fn transform(dataset: &RawDataset) -> EtlOutput {
    EtlOutput {
        master: MasterTable::build(dataset),
        payment_summary: payment_type_summary(&dataset.payments),
        category_revenue: category_revenue(&dataset.items, &dataset.products),
    }
}

/// Row counts and output locations of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlSummary {
    pub run_id: String,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub orders: usize,
    pub customers: usize,
    pub payments: usize,
    pub items: usize,
    pub products: usize,
    pub master_rows: usize,
    /// Orders whose customer id matched no customer record.
    pub unmatched_customers: usize,
    pub orders_without_items: usize,
    pub orders_without_payments: usize,
    pub payment_types: usize,
    pub categories: usize,
    pub outputs: Vec<PathBuf>,
    pub duration_ms: u64,
}

impl EtlSummary {
    pub fn render_summary(&self) -> String {
        let mut lines = vec![
            format!("ETL run {}", self.run_id),
            format!(
                "  raw: {} orders, {} customers, {} payments, {} items, {} products",
                self.orders, self.customers, self.payments, self.items, self.products
            ),
            format!(
                "  master: {} rows ({} without customer, {} without items, {} without payments)",
                self.master_rows,
                self.unmatched_customers,
                self.orders_without_items,
                self.orders_without_payments
            ),
            format!(
                "  aggregates: {} payment types, {} categories",
                self.payment_types, self.categories
            ),
        ];
        lines.extend(self.outputs.iter().map(|p| format!("  wrote {}", p.display())));
        lines.push(format!("  took {} ms", self.duration_ms));
        lines.join("\n")
    }
}

/// Load, transform and persist one dataset.
pub fn run_etl(config: &Config) -> Result<EtlSummary> {
    let run_id = RunId::new();
    let span = info_span!("etl", run_id = %run_id);
    let _guard = span.enter();
    let started = Instant::now();

    let loader = RawLoader::from_config(config);
    let dataset = loader.load()?;
    let output = transform(&dataset);

    let store = ProcessedStore::new(config.paths.processed_dir.clone());
    let outputs = store.write_all(
        output.master.rows(),
        &output.payment_summary,
        &output.category_revenue,
    )?;

    let rows = output.master.rows();
    let summary = EtlSummary {
        run_id: run_id.to_string(),
        raw_dir: config.paths.raw_dir.clone(),
        processed_dir: config.paths.processed_dir.clone(),
        orders: dataset.orders.len(),
        customers: dataset.customers.len(),
        payments: dataset.payments.len(),
        items: dataset.items.len(),
        products: dataset.products.len(),
        master_rows: rows.len(),
        unmatched_customers: rows.iter().filter(|r| r.customer_unique_id.is_none()).count(),
        orders_without_items: rows.iter().filter(|r| r.items.is_none()).count(),
        orders_without_payments: rows.iter().filter(|r| r.total_paid.is_none()).count(),
        payment_types: output.payment_summary.len(),
        categories: output.category_revenue.len(),
        outputs,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    info!(
        master_rows = summary.master_rows,
        unmatched_customers = summary.unmatched_customers,
        duration_ms = summary.duration_ms,
        "etl complete"
    );
    Ok(summary)
}
