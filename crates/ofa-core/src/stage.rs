//! Funnel stage resolution.
//!
//! Each stage is paired with a predicate over an order's milestone
//! timestamps. The resolved stage is the last entry in [`STAGE_TABLE`] whose
//! predicate holds; milestones are not required to be contiguous, so an order
//! delivered to the customer without a recorded approval still resolves to
//! `delivered_customer`.

use chrono::NaiveDateTime;
use ofa_common::Stage;

use crate::loader::OrderRecord;

/// The lifecycle timestamps that drive stage resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Milestones {
    pub purchased: Option<NaiveDateTime>,
    pub approved: Option<NaiveDateTime>,
    pub delivered_carrier: Option<NaiveDateTime>,
    pub delivered_customer: Option<NaiveDateTime>,
}

impl From<&OrderRecord> for Milestones {
    fn from(order: &OrderRecord) -> Self {
        Self {
            purchased: order.order_purchase_timestamp,
            approved: order.order_approved_at,
            delivered_carrier: order.order_delivered_carrier_date,
            delivered_customer: order.order_delivered_customer_date,
        }
    }
}

/// Predicate deciding whether an order has reached a stage.
pub type StagePredicate = fn(&Milestones) -> bool;

fn is_created(m: &Milestones) -> bool {
    m.purchased.is_some()
}

fn is_approved(m: &Milestones) -> bool {
    m.approved.is_some()
}

fn is_delivered_carrier(m: &Milestones) -> bool {
    m.delivered_carrier.is_some()
}

fn is_delivered_customer(m: &Milestones) -> bool {
    m.delivered_customer.is_some()
}

/// Stages in funnel order with the predicate that marks each as reached.
pub const STAGE_TABLE: [(Stage, StagePredicate); 4] = [
    (Stage::Created, is_created),
    (Stage::Approved, is_approved),
    (Stage::DeliveredCarrier, is_delivered_carrier),
    (Stage::DeliveredCustomer, is_delivered_customer),
];

/// Furthest stage whose predicate holds. Every order is at least `created`.
pub fn resolve_stage(milestones: &Milestones) -> Stage {
    STAGE_TABLE
        .iter()
        .filter(|(_, reached)| reached(milestones))
        .map(|(stage, _)| *stage)
        .last()
        .unwrap_or(Stage::Created)
}

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Days between approval and customer delivery. Absent when either endpoint
/// is missing; negative when the data records delivery before approval.
pub fn sla_days(
    approved: Option<NaiveDateTime>,
    delivered_customer: Option<NaiveDateTime>,
) -> Option<f64> {
    let elapsed = delivered_customer? - approved?;
    Some(elapsed.num_milliseconds() as f64 / MILLIS_PER_DAY)
}
