//! Metrics engine.
//!
//! Pure functions over master rows (a full table or a filtered one, possibly
//! empty). None of them mutate their input, and every ratio is guarded so a
//! zero denominator yields 0.0 rather than NaN.
//!
//! The exception is [`global`], whose accessors read the dataset-wide
//! aggregates persisted by the ETL and ignore any row filter.

pub mod cohort;
pub mod funnel;
pub mod geo;
pub mod global;
pub mod sla;
pub mod weekly;

pub use cohort::{cohort_retention, RetentionMatrix};
pub use funnel::{funnel_counts, funnel_cr, FunnelConversion, FunnelCounts, StepConversion};
pub use geo::{top_geo, GeoRevenue};
pub use global::{aggregate_columns, category_revenue, payment_breakdown, GlobalAggregate};
pub use sla::{sla_distribution, SlaSummary};
pub use weekly::{weekly_kpis, WeeklyKpi};
