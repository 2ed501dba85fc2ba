//! Monthly cohort retention.
//!
//! A customer's cohort is the month of their first purchase. For every
//! (cohort, period) cell the matrix counts distinct customers of that cohort
//! with an order placed `period` months after the cohort month, then divides
//! each row by its period-0 count.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::NaiveDate;
use ofa_common::{CustomerUniqueId, MasterRow};
use ofa_math::count_ratio;
use serde::{Deserialize, Serialize};

use crate::calendar::months_between;

/// Cohort × period retention, rows ascending by cohort and columns
/// ascending by period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionMatrix {
    pub cohorts: Vec<NaiveDate>,
    pub periods: Vec<u32>,
    /// Distinct active customers per cell.
    pub active: Vec<Vec<u64>>,
    /// `active` normalised by the row's period-0 count.
    pub retention: Vec<Vec<f64>>,
}

impl RetentionMatrix {
    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    /// Retention for one cell; 0.0 for cells outside the matrix.
    pub fn get(&self, cohort: NaiveDate, period: u32) -> f64 {
        let Ok(row) = self.cohorts.binary_search(&cohort) else {
            return 0.0;
        };
        let Ok(col) = self.periods.binary_search(&period) else {
            return 0.0;
        };
        self.retention[row][col]
    }

    /// Size of a cohort: its period-0 count.
    pub fn cohort_size(&self, cohort: NaiveDate) -> u64 {
        let Ok(row) = self.cohorts.binary_search(&cohort) else {
            return 0;
        };
        match self.periods.first() {
            Some(0) => self.active[row][0],
            _ => 0,
        }
    }
}

/// Build the retention matrix. Rows without a purchase month, cohort month
/// or unique customer id are excluded, as are rows dated before their own
/// cohort (possible only in hand-built input).
pub fn cohort_retention(rows: &[MasterRow]) -> RetentionMatrix {
    let mut cells: BTreeMap<(NaiveDate, u32), HashSet<&CustomerUniqueId>> = BTreeMap::new();
    let mut cohorts = BTreeSet::new();
    let mut periods = BTreeSet::new();

    for row in rows {
        let (Some(month), Some(cohort), Some(uid)) = (
            row.order_purchase_month,
            row.cohort_month,
            row.customer_unique_id.as_ref(),
        ) else {
            continue;
        };
        let Ok(period) = u32::try_from(months_between(cohort, month)) else {
            continue;
        };
        cohorts.insert(cohort);
        periods.insert(period);
        cells.entry((cohort, period)).or_default().insert(uid);
    }

    let cohorts: Vec<NaiveDate> = cohorts.into_iter().collect();
    let periods: Vec<u32> = periods.into_iter().collect();

    let active: Vec<Vec<u64>> = cohorts
        .iter()
        .map(|cohort| {
            periods
                .iter()
                .map(|period| {
                    cells
                        .get(&(*cohort, *period))
                        .map_or(0, |customers| customers.len() as u64)
                })
                .collect()
        })
        .collect();

    let retention = active
        .iter()
        .map(|counts| {
            let base = match periods.first() {
                Some(0) => counts[0],
                _ => 0,
            };
            counts.iter().map(|&n| count_ratio(n, base)).collect()
        })
        .collect();

    RetentionMatrix {
        cohorts,
        periods,
        active,
        retention,
    }
}
