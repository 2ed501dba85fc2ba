//! Row fixtures shared by unit tests.

use chrono::NaiveDate;
use ofa_common::{MasterRow, Stage};

/// A created order in week 2018-01-01 with every optional field absent.
pub(crate) fn row(order_id: &str) -> MasterRow {
    let jan = NaiveDate::from_ymd_opt(2018, 1, 1);
    MasterRow {
        order_id: order_id.into(),
        customer_id: format!("c-{order_id}").as_str().into(),
        order_status: None,
        order_purchase_timestamp: jan.and_then(|d| d.and_hms_opt(9, 0, 0)),
        order_approved_at: None,
        order_delivered_carrier_date: None,
        order_delivered_customer_date: None,
        order_estimated_delivery_date: None,
        status_stage: Stage::Created,
        order_purchase_date: jan,
        order_purchase_week: jan,
        order_purchase_month: jan,
        sla_days: None,
        customer_unique_id: None,
        customer_city: None,
        customer_state: None,
        total_paid: None,
        items: None,
        revenue: None,
        cohort_month: None,
    }
}

/// A row staged at `stage`.
pub(crate) fn staged(order_id: &str, stage: Stage) -> MasterRow {
    MasterRow {
        status_stage: stage,
        ..row(order_id)
    }
}
