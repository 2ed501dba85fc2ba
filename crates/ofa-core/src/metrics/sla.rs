//! Approval-to-delivery duration distribution.

use ofa_common::MasterRow;
use serde::{Deserialize, Serialize};

/// Present `sla_days` values in row order.
pub fn sla_distribution(rows: &[MasterRow]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.sla_days).collect()
}

/// Location summary of an SLA distribution for the text digest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlaSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub p90: f64,
}

impl SlaSummary {
    /// `None` for an empty distribution.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        Some(Self {
            count,
            mean: sorted.iter().sum::<f64>() / count as f64,
            median: quantile(&sorted, 0.5),
            p90: quantile(&sorted, 0.9),
        })
    }
}

/// Linear-interpolated quantile of sorted, non-empty values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
