//! Weekly order, delivery and revenue KPIs.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use ofa_common::{MasterRow, OrderId};
use ofa_math::safe_ratio;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyKpi {
    /// Monday of the purchase week.
    pub order_purchase_week: NaiveDate,
    /// Distinct orders placed that week.
    pub orders: u64,
    /// Orders with a customer-delivery timestamp.
    pub delivered: u64,
    pub revenue: f64,
    /// Revenue over distinct order count.
    pub aov: f64,
}

#[derive(Default)]
struct WeekAccumulator<'a> {
    orders: HashSet<&'a OrderId>,
    delivered: u64,
    revenue: f64,
}

/// KPIs per purchase week, weeks ascending. Rows without a purchase week are
/// skipped.
pub fn weekly_kpis(rows: &[MasterRow]) -> Vec<WeeklyKpi> {
    let mut weeks: BTreeMap<NaiveDate, WeekAccumulator<'_>> = BTreeMap::new();
    for row in rows {
        let Some(week) = row.order_purchase_week else {
            continue;
        };
        let acc = weeks.entry(week).or_default();
        acc.orders.insert(&row.order_id);
        if row.order_delivered_customer_date.is_some() {
            acc.delivered += 1;
        }
        acc.revenue += row.revenue.unwrap_or(0.0);
    }

    weeks
        .into_iter()
        .map(|(week, acc)| {
            let orders = acc.orders.len() as u64;
            WeeklyKpi {
                order_purchase_week: week,
                orders,
                delivered: acc.delivered,
                revenue: acc.revenue,
                aov: safe_ratio(acc.revenue, orders as f64),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::row;

    fn week(d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2018, 1, d)
    }

    #[test]
    fn weeks_ascend_with_aov() {
        let mut a = row("a");
        a.order_purchase_week = week(8);
        a.revenue = Some(30.0);
        a.order_delivered_customer_date = a.order_purchase_timestamp;
        let mut b = row("b");
        b.order_purchase_week = week(8);
        b.revenue = Some(10.0);
        let mut c = row("c");
        c.order_purchase_week = week(1);
        c.revenue = None;

        let kpis = weekly_kpis(&[a, b, c]);
        assert_eq!(kpis.len(), 2);
        assert_eq!(kpis[0].order_purchase_week, week(1).unwrap());
        assert_eq!(kpis[0].revenue, 0.0);
        assert_eq!(kpis[0].aov, 0.0);

        assert_eq!(kpis[1].orders, 2);
        assert_eq!(kpis[1].delivered, 1);
        assert_eq!(kpis[1].revenue, 40.0);
        assert_eq!(kpis[1].aov, 20.0);
    }

    #[test]
    fn duplicate_order_rows_count_once() {
        let a = row("a");
        let kpis = weekly_kpis(&[a.clone(), a]);
        assert_eq!(kpis[0].orders, 1);
    }

    #[test]
    fn undated_rows_are_skipped() {
        let mut a = row("a");
        a.order_purchase_week = None;
        assert!(weekly_kpis(&[a]).is_empty());
        assert!(weekly_kpis(&[]).is_empty());
    }
}
