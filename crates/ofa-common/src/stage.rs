//! Order funnel stages.
//!
//! Stages form a total order: `created < approved < delivered_carrier <
//! delivered_customer`. The derived `Ord` follows declaration order, so
//! `max()` over reached stages is the furthest one.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One milestone in the order lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Order placed (purchase timestamp).
    Created,
    /// Payment approved.
    Approved,
    /// Handed to the carrier.
    DeliveredCarrier,
    /// Delivered to the customer.
    DeliveredCustomer,
}

impl Stage {
    /// All stages in funnel order.
    pub const ALL: [Stage; 4] = [
        Stage::Created,
        Stage::Approved,
        Stage::DeliveredCarrier,
        Stage::DeliveredCustomer,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Created => "created",
            Stage::Approved => "approved",
            Stage::DeliveredCarrier => "delivered_carrier",
            Stage::DeliveredCustomer => "delivered_customer",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| Error::InvalidValue {
                field: "status_stage",
                value: s.to_string(),
            })
    }
}
