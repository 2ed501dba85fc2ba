//! Row filters applied to the master table before computing metrics.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use ofa_common::MasterRow;
use serde::{Deserialize, Serialize};

use crate::master::MasterTable;

/// Purchase-week range and customer-state membership.
///
/// Both bounds are inclusive and compared against `order_purchase_week`. An
/// empty `states` set places no constraint on state. Rows lacking the field a
/// constraint inspects are excluded while that constraint is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_to: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub states: BTreeSet<String>,
}

impl OrderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn week_from(mut self, week: NaiveDate) -> Self {
        self.week_from = Some(week);
        self
    }

    pub fn week_to(mut self, week: NaiveDate) -> Self {
        self.week_to = Some(week);
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.states.insert(state.into());
        self
    }

    /// True when the filter keeps every row.
    pub fn is_empty(&self) -> bool {
        self.week_from.is_none() && self.week_to.is_none() && self.states.is_empty()
    }

    pub fn matches(&self, row: &MasterRow) -> bool {
        if self.week_from.is_some() || self.week_to.is_some() {
            let Some(week) = row.order_purchase_week else {
                return false;
            };
            if self.week_from.is_some_and(|from| week < from) {
                return false;
            }
            if self.week_to.is_some_and(|to| week > to) {
                return false;
            }
        }
        if !self.states.is_empty() {
            match row.customer_state.as_deref() {
                Some(state) if self.states.contains(state) => {}
                _ => return false,
            }
        }
        true
    }

    pub fn apply(&self, table: &MasterTable) -> MasterTable {
        if self.is_empty() {
            return table.clone();
        }
        table.filter(|row| self.matches(row))
    }
}
