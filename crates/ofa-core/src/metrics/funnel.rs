//! Stage counts and step conversion rates.

use ofa_common::{MasterRow, Stage};
use ofa_math::count_ratio;
use serde::{Deserialize, Serialize};

/// Orders per funnel stage. Each order sits in exactly one bucket: the
/// furthest stage it reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelCounts {
    pub created: u64,
    pub approved: u64,
    pub delivered_carrier: u64,
    pub delivered_customer: u64,
}

impl FunnelCounts {
    pub fn get(&self, stage: Stage) -> u64 {
        match stage {
            Stage::Created => self.created,
            Stage::Approved => self.approved,
            Stage::DeliveredCarrier => self.delivered_carrier,
            Stage::DeliveredCustomer => self.delivered_customer,
        }
    }

    fn bump(&mut self, stage: Stage) {
        match stage {
            Stage::Created => self.created += 1,
            Stage::Approved => self.approved += 1,
            Stage::DeliveredCarrier => self.delivered_carrier += 1,
            Stage::DeliveredCustomer => self.delivered_customer += 1,
        }
    }

    /// Sum across all buckets; equals the number of rows counted.
    pub fn total(&self) -> u64 {
        Stage::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// `(stage, count)` pairs in funnel order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, u64)> + '_ {
        Stage::ALL.into_iter().map(move |s| (s, self.get(s)))
    }
}

pub fn funnel_counts(rows: &[MasterRow]) -> FunnelCounts {
    let mut counts = FunnelCounts::default();
    for row in rows {
        counts.bump(row.status_stage);
    }
    counts
}

/// Conversion between two adjacent stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepConversion {
    pub from: Stage,
    pub to: Stage,
    /// `"<from>→<to>"`.
    pub label: String,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelConversion {
    pub steps: Vec<StepConversion>,
    /// Last stage over first stage.
    pub overall: f64,
}

/// Ratios of adjacent bucket counts.
///
/// Rates are bucket ratios, not cumulative reach, so they are not clamped and
/// can exceed 1.0 when a later bucket holds more orders than an earlier one.
pub fn funnel_cr(counts: &FunnelCounts) -> FunnelConversion {
    let steps = Stage::ALL
        .windows(2)
        .map(|pair| {
            let (from, to) = (pair[0], pair[1]);
            StepConversion {
                from,
                to,
                label: format!("{from}→{to}"),
                rate: count_ratio(counts.get(to), counts.get(from)),
            }
        })
        .collect();
    FunnelConversion {
        steps,
        overall: count_ratio(counts.get(Stage::DeliveredCustomer), counts.get(Stage::Created)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{resolve_stage, Milestones};
    use crate::test_support::staged;

    fn rows(buckets: &[(Stage, usize)]) -> Vec<MasterRow> {
        let mut out = Vec::new();
        for (stage, n) in buckets {
            for i in 0..*n {
                out.push(staged(&format!("{stage}-{i}"), *stage));
            }
        }
        out
    }

    #[test]
    fn counts_bucket_each_order_once() {
        let rows = rows(&[
            (Stage::Created, 100),
            (Stage::Approved, 80),
            (Stage::DeliveredCarrier, 60),
            (Stage::DeliveredCustomer, 50),
        ]);
        let counts = funnel_counts(&rows);
        assert_eq!(counts.created, 100);
        assert_eq!(counts.delivered_customer, 50);
        assert_eq!(counts.total(), rows.len() as u64);
    }

    #[test]
    fn conversion_of_descending_buckets() {
        let counts = FunnelCounts {
            created: 100,
            approved: 80,
            delivered_carrier: 60,
            delivered_customer: 50,
        };
        let cr = funnel_cr(&counts);
        let rates: Vec<f64> = cr.steps.iter().map(|s| s.rate).collect();
        assert_eq!(rates, [0.8, 0.75, 50.0 / 60.0]);
        assert_eq!(cr.overall, 0.5);
        assert_eq!(cr.steps[0].label, "created→approved");
        assert_eq!(cr.steps[2].label, "delivered_carrier→delivered_customer");
    }

    #[test]
    fn four_resolved_orders() {
        let at = |h| {
            chrono::NaiveDate::from_ymd_opt(2018, 1, 1).and_then(|d| d.and_hms_opt(h, 0, 0))
        };
        let purchased_only = Milestones {
            purchased: at(8),
            ..Milestones::default()
        };
        let approved = Milestones {
            approved: at(9),
            ..purchased_only
        };
        let delivered = Milestones {
            delivered_customer: at(20),
            ..approved
        };
        let orders = [&purchased_only, &purchased_only, &approved, &delivered];
        let rows: Vec<MasterRow> = orders
            .iter()
            .enumerate()
            .map(|(i, m)| staged(&format!("o{i}"), resolve_stage(m)))
            .collect();

        let counts = funnel_counts(&rows);
        assert_eq!(
            counts,
            FunnelCounts {
                created: 2,
                approved: 1,
                delivered_carrier: 0,
                delivered_customer: 1,
            }
        );
        let cr = funnel_cr(&counts);
        assert_eq!(cr.steps[0].label, "created→approved");
        assert_eq!(cr.steps[0].rate, 0.5);
        assert_eq!(cr.overall, 0.5);
    }

    #[test]
    fn empty_input_yields_zeros() {
        let counts = funnel_counts(&[]);
        assert_eq!(counts, FunnelCounts::default());
        let cr = funnel_cr(&counts);
        assert_eq!(cr.steps.len(), 3);
        assert!(cr.steps.iter().all(|s| s.rate == 0.0));
        assert_eq!(cr.overall, 0.0);
    }

    #[test]
    fn missing_stage_guards_denominator() {
        let counts = FunnelCounts {
            created: 10,
            approved: 0,
            delivered_carrier: 4,
            delivered_customer: 2,
        };
        let cr = funnel_cr(&counts);
        assert_eq!(cr.steps[0].rate, 0.0);
        assert_eq!(cr.steps[1].rate, 0.0);
        assert_eq!(cr.steps[2].rate, 0.5);
    }

    #[test]
    fn iter_follows_funnel_order() {
        let counts = FunnelCounts {
            created: 1,
            approved: 2,
            delivered_carrier: 3,
            delivered_customer: 4,
        };
        let values: Vec<u64> = counts.iter().map(|(_, n)| n).collect();
        assert_eq!(values, [1, 2, 3, 4]);
    }
}
