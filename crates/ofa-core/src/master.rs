//! The order-level master table.
//!
//! One row per order, in input order, with the resolved stage, purchase keys,
//! SLA, customer attributes, payment and item aggregates, and the customer's
//! cohort month. Every join is a left join keyed on the order (or its
//! customer), so an order is never dropped for lack of a match.
//!
//! A built table is immutable; filtering produces a new table.

use std::collections::HashMap;

use chrono::NaiveDate;
use ofa_common::{CustomerId, CustomerUniqueId, MasterRow};
use tracing::debug;

use crate::aggregate::{items_per_order, payments_per_order};
use crate::calendar::PurchaseKeys;
use crate::loader::{CustomerRecord, RawDataset};
use crate::stage::{resolve_stage, sla_days, Milestones};

/// Immutable collection of master rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterTable {
    rows: Vec<MasterRow>,
}

impl MasterTable {
    /// Wrap rows read back from storage or built elsewhere.
    pub fn from_rows(rows: Vec<MasterRow>) -> Self {
        Self { rows }
    }

    /// Join the raw entities into master rows.
    pub fn build(dataset: &RawDataset) -> Self {
        let mut customers: HashMap<&CustomerId, &CustomerRecord> =
            HashMap::with_capacity(dataset.customers.len());
        for customer in &dataset.customers {
            customers.entry(&customer.customer_id).or_insert(customer);
        }
        let payments = payments_per_order(&dataset.payments);
        let items = items_per_order(&dataset.items);

        let mut rows: Vec<MasterRow> = dataset
            .orders
            .iter()
            .map(|order| {
                let milestones = Milestones::from(order);
                let keys = order.order_purchase_timestamp.map(PurchaseKeys::from_timestamp);
                let customer = customers.get(&order.customer_id).copied();
                let order_items = items.get(&order.order_id);

                MasterRow {
                    order_id: order.order_id.clone(),
                    customer_id: order.customer_id.clone(),
                    order_status: order.order_status.clone(),
                    order_purchase_timestamp: order.order_purchase_timestamp,
                    order_approved_at: order.order_approved_at,
                    order_delivered_carrier_date: order.order_delivered_carrier_date,
                    order_delivered_customer_date: order.order_delivered_customer_date,
                    order_estimated_delivery_date: order.order_estimated_delivery_date,
                    status_stage: resolve_stage(&milestones),
                    order_purchase_date: keys.map(|k| k.date),
                    order_purchase_week: keys.map(|k| k.week),
                    order_purchase_month: keys.map(|k| k.month),
                    sla_days: sla_days(order.order_approved_at, order.order_delivered_customer_date),
                    customer_unique_id: customer.and_then(|c| c.customer_unique_id.clone()),
                    customer_city: customer.and_then(|c| c.customer_city.clone()),
                    customer_state: customer.and_then(|c| c.customer_state.clone()),
                    total_paid: payments.get(&order.order_id).copied(),
                    items: order_items.map(|t| t.items),
                    revenue: order_items.map(|t| t.revenue),
                    cohort_month: None,
                }
            })
            .collect();

        assign_cohorts(&mut rows);

        debug!(
            rows = rows.len(),
            unmatched_customers = rows.iter().filter(|r| r.customer_unique_id.is_none()).count(),
            "master table built"
        );
        Self { rows }
    }

    pub fn rows(&self) -> &[MasterRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MasterRow> {
        self.rows.iter()
    }

    /// New table holding the rows that satisfy `keep`.
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&MasterRow) -> bool,
    {
        Self {
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MasterTable {
    type Item = &'a MasterRow;
    type IntoIter = std::slice::Iter<'a, MasterRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// First purchase month per unique customer, broadcast to all of that
/// customer's orders. Orders without a unique customer or whose customer has
/// no dated purchase get no cohort.
fn assign_cohorts(rows: &mut [MasterRow]) {
    let mut first_month: HashMap<CustomerUniqueId, NaiveDate> = HashMap::new();
    for row in rows.iter() {
        if let (Some(uid), Some(month)) = (&row.customer_unique_id, row.order_purchase_month) {
            first_month
                .entry(uid.clone())
                .and_modify(|m| *m = (*m).min(month))
                .or_insert(month);
        }
    }
    for row in rows.iter_mut() {
        row.cohort_month = row
            .customer_unique_id
            .as_ref()
            .and_then(|uid| first_month.get(uid).copied());
    }
}
