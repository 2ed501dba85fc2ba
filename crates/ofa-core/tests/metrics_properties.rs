//! Invariants of the stage resolver and metrics engine over generated data.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use ofa_common::{Stage, UNKNOWN_CATEGORY};
use ofa_core::loader::{CustomerRecord, ItemRecord, OrderRecord, ProductRecord};
use ofa_core::metrics::{cohort_retention, funnel_counts, funnel_cr, weekly_kpis};
use ofa_core::stage::{resolve_stage, Milestones};
use ofa_core::{transform, RawDataset};
use proptest::prelude::*;

fn base() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2017, 1, 2)
        .and_then(|d| d.and_hms_opt(8, 0, 0))
        .unwrap()
}

fn maybe_ts() -> impl Strategy<Value = Option<NaiveDateTime>> {
    prop::option::of((0i64..700).prop_map(|days| base() + Duration::days(days)))
}

prop_compose! {
    fn arb_order(idx: usize)(
        customer in 0usize..12,
        purchased in maybe_ts(),
        approved in maybe_ts(),
        carrier in maybe_ts(),
        delivered in maybe_ts(),
    ) -> OrderRecord {
        OrderRecord {
            order_id: format!("o{idx}").into(),
            customer_id: format!("c{customer}-{idx}").into(),
            order_status: None,
            order_purchase_timestamp: purchased,
            order_approved_at: approved,
            order_delivered_carrier_date: carrier,
            order_delivered_customer_date: delivered,
            order_estimated_delivery_date: None,
        }
    }
}

fn arb_dataset() -> impl Strategy<Value = RawDataset> {
    (0usize..40)
        .prop_flat_map(|n| (0..n).map(arb_order).collect::<Vec<_>>())
        .prop_flat_map(|orders| {
            let n = orders.len();
            (
                Just(orders),
                prop::collection::vec(
                    (0usize..n.max(1), prop::option::of(0u32..4), prop::option::of(1.0f64..500.0)),
                    0..60,
                ),
            )
        })
        .prop_map(|(orders, item_specs)| {
            // Customer ids encode the unique shopper before the dash.
            let customers = orders
                .iter()
                .map(|o| {
                    let id = o.customer_id.as_str();
                    let unique = id.split('-').next().unwrap_or(id);
                    CustomerRecord {
                        customer_id: o.customer_id.clone(),
                        customer_unique_id: Some(unique.into()),
                        customer_city: Some("city".into()),
                        customer_state: Some("SP".into()),
                    }
                })
                .collect();
            let items = item_specs
                .into_iter()
                .filter(|_| !orders.is_empty())
                .map(|(order, product, price)| ItemRecord {
                    order_id: orders[order % orders.len()].order_id.clone(),
                    order_item_id: Some(1),
                    product_id: product.map(|p| format!("p{p}").into()),
                    price,
                    freight_value: Some(5.0),
                })
                .collect();
            let products = vec![
                ProductRecord { product_id: "p0".into(), product_category_name: Some("toys".into()) },
                ProductRecord { product_id: "p1".into(), product_category_name: Some("books".into()) },
                ProductRecord { product_id: "p2".into(), product_category_name: None },
            ];
            RawDataset {
                orders,
                customers,
                payments: Vec::new(),
                items,
                products,
            }
        })
}

proptest! {
    #[test]
    fn stage_is_furthest_present_milestone(
        purchased in maybe_ts(),
        approved in maybe_ts(),
        carrier in maybe_ts(),
        delivered in maybe_ts(),
    ) {
        let m = Milestones {
            purchased,
            approved,
            delivered_carrier: carrier,
            delivered_customer: delivered,
        };
        let expected = if delivered.is_some() {
            Stage::DeliveredCustomer
        } else if carrier.is_some() {
            Stage::DeliveredCarrier
        } else if approved.is_some() {
            Stage::Approved
        } else {
            Stage::Created
        };
        prop_assert_eq!(resolve_stage(&m), expected);
    }

    #[test]
    fn funnel_counts_sum_to_rows(dataset in arb_dataset()) {
        let out = transform(&dataset);
        let counts = funnel_counts(out.master.rows());
        prop_assert_eq!(counts.total(), out.master.len() as u64);
        prop_assert_eq!(out.master.len(), dataset.orders.len());
    }

    #[test]
    fn conversion_rates_are_finite(
        created in 0u64..1000,
        approved in 0u64..1000,
        carrier in 0u64..1000,
        delivered in 0u64..1000,
    ) {
        let counts = ofa_core::metrics::FunnelCounts {
            created,
            approved,
            delivered_carrier: carrier,
            delivered_customer: delivered,
        };
        let cr = funnel_cr(&counts);
        for step in &cr.steps {
            prop_assert!(step.rate.is_finite());
            prop_assert!(step.rate >= 0.0);
            if counts.get(step.from) == 0 {
                prop_assert_eq!(step.rate, 0.0);
            }
        }
        prop_assert!(cr.overall.is_finite());
    }

    #[test]
    fn retention_is_bounded_with_unit_period_zero(dataset in arb_dataset()) {
        let out = transform(&dataset);
        let matrix = cohort_retention(out.master.rows());
        for (row, cohort) in matrix.retention.iter().zip(&matrix.cohorts) {
            for &cell in row {
                prop_assert!((0.0..=1.0).contains(&cell), "cell {} out of range", cell);
            }
            prop_assert_eq!(matrix.get(*cohort, 0), 1.0);
        }
    }

    #[test]
    fn cohort_never_follows_purchase_month(dataset in arb_dataset()) {
        let out = transform(&dataset);
        for row in out.master.iter() {
            if let (Some(cohort), Some(month)) = (row.cohort_month, row.order_purchase_month) {
                prop_assert!(
                    cohort <= month,
                    "{}: cohort {} after purchase month {}",
                    row.order_id.as_str(),
                    cohort,
                    month
                );
            }
            if row.customer_unique_id.is_some() && row.order_purchase_month.is_some() {
                prop_assert!(row.cohort_month.is_some());
            }
        }
    }

    #[test]
    fn category_revenue_matches_item_revenue(dataset in arb_dataset()) {
        let out = transform(&dataset);
        let by_category: f64 = out.category_revenue.iter().map(|c| c.revenue).sum();
        let by_item: f64 = dataset.items.iter().filter_map(|i| i.revenue()).sum();
        prop_assert!((by_category - by_item).abs() < 1e-6);

        let items: u64 = out.category_revenue.iter().map(|c| c.items).sum();
        prop_assert_eq!(items, dataset.items.len() as u64);

        let uncategorised = dataset
            .items
            .iter()
            .filter(|i| !matches!(i.product_id.as_ref().map(|p| p.as_str()), Some("p0") | Some("p1")))
            .count() as u64;
        let unknown = out
            .category_revenue
            .iter()
            .find(|c| c.product_category_name == UNKNOWN_CATEGORY)
            .map_or(0, |c| c.items);
        prop_assert_eq!(unknown, uncategorised);
    }

    #[test]
    fn weekly_orders_never_exceed_rows(dataset in arb_dataset()) {
        let out = transform(&dataset);
        let weekly: u64 = weekly_kpis(out.master.rows()).iter().map(|w| w.orders).sum();
        let dated = out.master.iter().filter(|r| r.order_purchase_week.is_some()).count() as u64;
        prop_assert_eq!(weekly, dated);
    }
}
