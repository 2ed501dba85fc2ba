//! Per-order and global aggregates over the raw line-level entities.

use std::collections::{BTreeMap, HashMap};

use ofa_common::{CategoryRevenue, OrderId, PaymentTypeTotal, ProductId, UNKNOWN_CATEGORY};

use crate::loader::{ItemRecord, PaymentRecord, ProductRecord};

/// Item count and revenue of one order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ItemTotals {
    pub items: u32,
    pub revenue: f64,
}

/// Sum of paid amounts per order. Payments without a value contribute zero,
/// so an order with payment records always gets an entry.
pub fn payments_per_order(payments: &[PaymentRecord]) -> HashMap<OrderId, f64> {
    let mut totals: HashMap<OrderId, f64> = HashMap::new();
    for payment in payments {
        *totals.entry(payment.order_id.clone()).or_default() += payment.payment_value.unwrap_or(0.0);
    }
    totals
}

/// Item count and revenue sum per order. Items whose revenue is absent count
/// toward `items` but add nothing to `revenue`.
pub fn items_per_order(items: &[ItemRecord]) -> HashMap<OrderId, ItemTotals> {
    let mut totals: HashMap<OrderId, ItemTotals> = HashMap::new();
    for item in items {
        let entry = totals.entry(item.order_id.clone()).or_default();
        entry.items += 1;
        entry.revenue += item.revenue().unwrap_or(0.0);
    }
    totals
}

/// Paid total and record count per payment type, ordered by type name.
/// Records without a type are skipped.
pub fn payment_type_summary(payments: &[PaymentRecord]) -> Vec<PaymentTypeTotal> {
    let mut by_type: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for payment in payments {
        let Some(kind) = payment.payment_type.as_deref() else {
            continue;
        };
        let entry = by_type.entry(kind).or_default();
        entry.0 += payment.payment_value.unwrap_or(0.0);
        entry.1 += 1;
    }
    by_type
        .into_iter()
        .map(|(kind, (total, n))| PaymentTypeTotal {
            payment_type: kind.to_string(),
            total,
            n,
        })
        .collect()
}

/// Revenue and item count per product category, ordered by category name.
/// Items whose product is unknown or uncategorised land in
/// [`UNKNOWN_CATEGORY`].
pub fn category_revenue(items: &[ItemRecord], products: &[ProductRecord]) -> Vec<CategoryRevenue> {
    let mut categories: HashMap<&ProductId, &str> = HashMap::with_capacity(products.len());
    for product in products {
        if let Some(name) = product.product_category_name.as_deref() {
            categories.entry(&product.product_id).or_insert(name);
        }
    }

    let mut by_category: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for item in items {
        let category = item
            .product_id
            .as_ref()
            .and_then(|id| categories.get(id).copied())
            .unwrap_or(UNKNOWN_CATEGORY);
        let entry = by_category.entry(category).or_default();
        entry.0 += item.revenue().unwrap_or(0.0);
        entry.1 += 1;
    }

    by_category
        .into_iter()
        .map(|(name, (revenue, items))| CategoryRevenue {
            product_category_name: name.to_string(),
            revenue,
            items,
        })
        .collect()
}

/// The `n` highest-revenue categories, descending. Ties keep input order.
pub fn top_categories(rows: &[CategoryRevenue], n: usize) -> Vec<CategoryRevenue> {
    let mut ranked = rows.to_vec();
    ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranked.truncate(n);
    ranked
}
