//! Mock conversion experiment over the master table.
//!
//! Orders are split 50/50 by hashing their id, conversion means delivery to
//! the customer, and the readout tests whether variant B converts better
//! than A, alongside the sample size needed to detect a fixed uplift.

use std::fmt;

use ofa_common::{MasterRow, OrderId, Stage};
use ofa_math::{
    count_ratio, proportion_effect_size, required_sample_size, two_proportion_ztest, Alternative,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    A,
    B,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::A => f.write_str("A"),
            Variant::B => f.write_str("B"),
        }
    }
}

/// Deterministic assignment: B when the first digest byte is odd.
pub fn assign_variant(order_id: &OrderId) -> Variant {
    let digest = Sha256::digest(order_id.as_str().as_bytes());
    if digest[0] % 2 == 1 {
        Variant::B
    } else {
        Variant::A
    }
}

/// Experiment design parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentDesign {
    /// Absolute uplift the experiment should be able to detect.
    pub mde: f64,
    pub alpha: f64,
    pub power: f64,
    /// Baseline used for planning when variant A has no conversions.
    pub fallback_baseline: f64,
}

impl Default for ExperimentDesign {
    fn default() -> Self {
        Self {
            mde: 0.02,
            alpha: 0.05,
            power: 0.8,
            fallback_baseline: 0.10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantStats {
    pub variant: Variant,
    pub conversions: u64,
    pub n: u64,
    pub rate: f64,
}

impl VariantStats {
    fn new(variant: Variant, conversions: u64, n: u64) -> Self {
        Self {
            variant,
            conversions,
            n,
            rate: count_ratio(conversions, n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerAnalysis {
    pub baseline: f64,
    pub target: f64,
    pub effect_size: f64,
    /// Orders needed per group; absent when no finite size suffices.
    pub required_n_per_group: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbTestReport {
    pub a: VariantStats,
    pub b: VariantStats,
    /// `rate_B - rate_A`.
    pub uplift: f64,
    /// One-sided test of B converting better than A.
    pub z_statistic: f64,
    pub p_value: f64,
    pub design: ExperimentDesign,
    pub power: PowerAnalysis,
}

impl AbTestReport {
    pub fn is_significant(&self) -> bool {
        self.p_value < self.design.alpha
    }
}

pub fn analyze(rows: &[MasterRow], design: &ExperimentDesign) -> AbTestReport {
    let (mut conv_a, mut n_a, mut conv_b, mut n_b) = (0u64, 0u64, 0u64, 0u64);
    for row in rows {
        let converted = u64::from(row.status_stage == Stage::DeliveredCustomer);
        match assign_variant(&row.order_id) {
            Variant::A => {
                n_a += 1;
                conv_a += converted;
            }
            Variant::B => {
                n_b += 1;
                conv_b += converted;
            }
        }
    }

    let a = VariantStats::new(Variant::A, conv_a, n_a);
    let b = VariantStats::new(Variant::B, conv_b, n_b);
    let test = two_proportion_ztest(conv_b, n_b, conv_a, n_a, Alternative::Larger);

    let baseline = if a.rate > 0.0 {
        a.rate
    } else {
        design.fallback_baseline
    };
    let target = baseline + design.mde;
    let effect_size = proportion_effect_size(baseline, target);
    let required = required_sample_size(effect_size, design.alpha, design.power, 1.0, Alternative::Larger)
        .map(|n| n.floor() as u64);

    debug!(n_a, n_b, conv_a, conv_b, p_value = test.p_value, "experiment analysed");

    AbTestReport {
        uplift: b.rate - a.rate,
        a,
        b,
        z_statistic: test.statistic,
        p_value: test.p_value,
        design: *design,
        power: PowerAnalysis {
            baseline,
            target,
            effect_size,
            required_n_per_group: required,
        },
    }
}
