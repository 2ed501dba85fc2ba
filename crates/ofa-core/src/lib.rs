//! Order funnel analytics engine.
//!
//! The ETL turns raw marketplace CSV exports (orders, customers, payments,
//! items, products) into one order-level master table plus two global
//! aggregates, persisted as Parquet. The metrics layer computes funnel,
//! weekly, geographic, cohort, SLA and experiment readouts from those tables.
//!
//! Pipeline:
//! 1. [`loader`] locates and parses the raw exports.
//! 2. [`stage`] and [`calendar`] derive per-order fields.
//! 3. [`aggregate`] rolls up payments and items.
//! 4. [`master`] joins everything into the master table.
//! 5. [`etl`] writes the results through `ofa-store`.
//! 6. [`metrics`], [`report`] and [`abtest`] read them back.

pub mod abtest;
pub mod aggregate;
pub mod calendar;
pub mod cli;
pub mod etl;
pub mod exit_codes;
pub mod export;
pub mod filter;
pub mod loader;
pub mod master;
pub mod metrics;
pub mod report;
pub mod stage;

#[cfg(test)]
mod test_support;

pub use etl::{run_etl, transform, EtlOutput, EtlSummary};
pub use filter::OrderFilter;
pub use loader::{RawDataset, RawLoader};
pub use master::MasterTable;
pub use report::MetricsReport;
