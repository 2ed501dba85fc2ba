//! Order funnel analytics common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the ofa crates:
//! - Entity identity newtypes (orders, customers, products, ETL runs)
//! - The funnel stage ordering
//! - Row types for the persisted processed tables
//! - Common error types
//! - Output format specifications

pub mod error;
pub mod id;
pub mod output;
pub mod schema;
pub mod stage;
pub mod table;

pub use error::{Error, Result};
pub use id::{CustomerId, CustomerUniqueId, OrderId, ProductId, RunId};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
pub use stage::Stage;
pub use table::{CategoryRevenue, MasterRow, PaymentTypeTotal, UNKNOWN_CATEGORY};
