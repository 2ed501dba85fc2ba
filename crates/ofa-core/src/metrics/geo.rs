//! Revenue by customer location for delivered orders.

use std::collections::{BTreeMap, HashSet};

use ofa_common::{MasterRow, OrderId, Stage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRevenue {
    pub customer_state: String,
    pub customer_city: String,
    pub revenue: f64,
    pub orders: u64,
}

/// The `n` highest-revenue (state, city) pairs among orders delivered to the
/// customer. Rows missing state or city are skipped. Ties keep
/// (state, city) order.
pub fn top_geo(rows: &[MasterRow], n: usize) -> Vec<GeoRevenue> {
    let mut groups: BTreeMap<(&str, &str), (f64, HashSet<&OrderId>)> = BTreeMap::new();
    for row in rows {
        if row.status_stage != Stage::DeliveredCustomer {
            continue;
        }
        let (Some(state), Some(city)) = (row.customer_state.as_deref(), row.customer_city.as_deref())
        else {
            continue;
        };
        let entry = groups.entry((state, city)).or_default();
        entry.0 += row.revenue.unwrap_or(0.0);
        entry.1.insert(&row.order_id);
    }

    let mut ranked: Vec<GeoRevenue> = groups
        .into_iter()
        .map(|((state, city), (revenue, orders))| GeoRevenue {
            customer_state: state.to_string(),
            customer_city: city.to_string(),
            revenue,
            orders: orders.len() as u64,
        })
        .collect();
    ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranked.truncate(n);
    ranked
}
