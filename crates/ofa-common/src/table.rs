//! Row types for the processed tables.
//!
//! These are the contract between the ETL (which writes them) and every
//! downstream reader. Column names in `ofa-store` match the field names here.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::id::{CustomerId, CustomerUniqueId, OrderId};
use crate::stage::Stage;

/// Category bucket for items whose product is missing or uncategorised.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// One row of `orders_master`: an order with every per-order aggregate and
/// customer attribute joined on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterRow {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    /// Raw status string from the source system, passed through untouched.
    pub order_status: Option<String>,

    pub order_purchase_timestamp: Option<NaiveDateTime>,
    pub order_approved_at: Option<NaiveDateTime>,
    pub order_delivered_carrier_date: Option<NaiveDateTime>,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    pub order_estimated_delivery_date: Option<NaiveDateTime>,

    /// Furthest funnel stage reached.
    pub status_stage: Stage,
    pub order_purchase_date: Option<NaiveDate>,
    /// Monday of the ISO week containing the purchase.
    pub order_purchase_week: Option<NaiveDate>,
    /// First day of the purchase month.
    pub order_purchase_month: Option<NaiveDate>,
    /// Customer delivery minus approval, in days. Absent, not zero, when
    /// either endpoint is missing.
    pub sla_days: Option<f64>,

    pub customer_unique_id: Option<CustomerUniqueId>,
    pub customer_city: Option<String>,
    pub customer_state: Option<String>,

    pub total_paid: Option<f64>,
    pub items: Option<u32>,
    pub revenue: Option<f64>,

    /// First purchase month across every order of this unique customer.
    pub cohort_month: Option<NaiveDate>,
}

/// One row of `payment_type_summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTypeTotal {
    pub payment_type: String,
    /// Sum of paid amounts.
    pub total: f64,
    /// Number of payment records.
    pub n: u64,
}

/// One row of `category_revenue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRevenue {
    pub product_category_name: String,
    pub revenue: f64,
    pub items: u64,
}
