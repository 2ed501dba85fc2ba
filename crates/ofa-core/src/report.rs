//! Metrics report consumed by the rendering layer.

use chrono::{DateTime, Utc};
use ofa_common::{CategoryRevenue, PaymentTypeTotal, Result, SCHEMA_VERSION};
use ofa_config::MetricsDefaults;
use ofa_store::ProcessedStore;
use serde::{Deserialize, Serialize};

use crate::filter::OrderFilter;
use crate::master::MasterTable;
use crate::metrics::{
    category_revenue, cohort_retention, funnel_counts, funnel_cr, payment_breakdown, sla_distribution,
    top_geo, weekly_kpis, FunnelConversion, FunnelCounts, GeoRevenue, GlobalAggregate, RetentionMatrix,
    SlaSummary, WeeklyKpi,
};

/// Scope marker for aggregates that ignore the row filter.
pub const GLOBAL_SCOPE: &str = "global";

/// Every metric over one (possibly filtered) master table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub filter: OrderFilter,
    /// Rows left after filtering.
    pub orders: u64,
    pub funnel_counts: FunnelCounts,
    pub funnel_conversion: FunnelConversion,
    pub weekly_kpis: Vec<WeeklyKpi>,
    pub top_geo: Vec<GeoRevenue>,
    pub cohort_retention: RetentionMatrix,
    pub sla_days: Vec<f64>,
    pub sla_summary: Option<SlaSummary>,
    /// Always [`GLOBAL_SCOPE`]: payments are aggregated at ETL time.
    pub payment_breakdown_scope: String,
    pub payment_breakdown: GlobalAggregate<PaymentTypeTotal>,
    pub top_categories_scope: String,
    pub top_categories: GlobalAggregate<CategoryRevenue>,
}

impl MetricsReport {
    pub fn build(
        table: &MasterTable,
        store: &ProcessedStore,
        filter: &OrderFilter,
        limits: &MetricsDefaults,
    ) -> Result<Self> {
        let filtered = filter.apply(table);
        let rows = filtered.rows();
        let counts = funnel_counts(rows);
        let sla_days = sla_distribution(rows);

        Ok(Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            filter: filter.clone(),
            orders: rows.len() as u64,
            funnel_conversion: funnel_cr(&counts),
            funnel_counts: counts,
            weekly_kpis: weekly_kpis(rows),
            top_geo: top_geo(rows, limits.top_geo),
            cohort_retention: cohort_retention(rows),
            sla_summary: SlaSummary::from_values(&sla_days),
            sla_days,
            payment_breakdown_scope: GLOBAL_SCOPE.to_string(),
            payment_breakdown: payment_breakdown(store)?,
            top_categories_scope: GLOBAL_SCOPE.to_string(),
            top_categories: category_revenue(store, limits.top_categories)?,
        })
    }

    /// Short human-readable digest.
    pub fn render_summary(&self) -> String {
        let mut lines = vec![format!("Orders: {}", self.orders), String::new(), "Funnel".to_string()];
        for (stage, n) in self.funnel_counts.iter() {
            lines.push(format!("  {:<20} {n:>8}", stage.as_str()));
        }
        for step in &self.funnel_conversion.steps {
            lines.push(format!("  {:<38} {:>7.2}%", step.label, step.rate * 100.0));
        }
        lines.push(format!("  {:<38} {:>7.2}%", "overall", self.funnel_conversion.overall * 100.0));

        if let (Some(first), Some(last)) = (self.weekly_kpis.first(), self.weekly_kpis.last()) {
            let revenue: f64 = self.weekly_kpis.iter().map(|w| w.revenue).sum();
            lines.push(String::new());
            lines.push(format!(
                "Weeks: {} ({} to {}), revenue {:.2}",
                self.weekly_kpis.len(),
                first.order_purchase_week,
                last.order_purchase_week,
                revenue
            ));
        }

        if !self.top_geo.is_empty() {
            lines.push(String::new());
            lines.push("Top delivered locations".to_string());
            for geo in &self.top_geo {
                lines.push(format!(
                    "  {}/{:<24} {:>12.2} ({} orders)",
                    geo.customer_state, geo.customer_city, geo.revenue, geo.orders
                ));
            }
        }

        if !self.cohort_retention.is_empty() {
            lines.push(String::new());
            lines.push(format!("Cohorts: {}", self.cohort_retention.cohorts.len()));
            if let Some(first) = self.cohort_retention.cohorts.first() {
                lines.push(format!(
                    "  {first}: {} customers, month-1 retention {:.2}%",
                    self.cohort_retention.cohort_size(*first),
                    self.cohort_retention.get(*first, 1) * 100.0
                ));
            }
        }

        lines.push(String::new());
        lines.push(match &self.sla_summary {
            Some(sla) => format!(
                "Delivery SLA (days): n={} mean={:.2} median={:.2} p90={:.2}",
                sla.count, sla.mean, sla.median, sla.p90
            ),
            None => "Delivery SLA: no delivered orders".to_string(),
        });

        lines.push(String::new());
        lines.push(format!("Payments ({})", self.payment_breakdown_scope));
        match &self.payment_breakdown {
            GlobalAggregate::Missing => lines.push("  not available".to_string()),
            GlobalAggregate::Present(rows) => {
                for p in rows {
                    lines.push(format!("  {:<20} {:>14.2} ({} payments)", p.payment_type, p.total, p.n));
                }
            }
        }

        lines.push(String::new());
        lines.push(format!("Top categories ({})", self.top_categories_scope));
        match &self.top_categories {
            GlobalAggregate::Missing => lines.push("  not available".to_string()),
            GlobalAggregate::Present(rows) => {
                for c in rows {
                    lines.push(format!(
                        "  {:<40} {:>14.2} ({} items)",
                        c.product_category_name, c.revenue, c.items
                    ));
                }
            }
        }
        lines.join("\n")
    }
}
