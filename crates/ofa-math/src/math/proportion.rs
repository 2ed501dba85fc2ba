//! Two-sample proportion tests and sample-size planning.
//!
//! Used for conversion experiments where each unit either converts or not.

use serde::{Deserialize, Serialize};

use super::normal::{normal_cdf, normal_quantile, normal_sf};
use super::ratio::count_ratio;

/// Alternative hypothesis for a one- or two-sided test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alternative {
    /// H1: p1 != p2
    TwoSided,
    /// H1: p1 > p2
    Larger,
    /// H1: p1 < p2
    Smaller,
}

/// Result of a two-proportion z-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZTest {
    pub statistic: f64,
    pub p_value: f64,
}

/// Pooled two-proportion z-test of `count1 / nobs1` against `count2 / nobs2`.
///
/// When the pooled variance is zero (an empty group, or every unit in both
/// groups converting identically) there is no evidence either way and the
/// result is `statistic = 0.0, p_value = 1.0`.
pub fn two_proportion_ztest(
    count1: u64,
    nobs1: u64,
    count2: u64,
    nobs2: u64,
    alternative: Alternative,
) -> ZTest {
    let degenerate = ZTest {
        statistic: 0.0,
        p_value: 1.0,
    };
    if nobs1 == 0 || nobs2 == 0 {
        return degenerate;
    }

    let p1 = count_ratio(count1, nobs1);
    let p2 = count_ratio(count2, nobs2);
    let pooled = count_ratio(count1 + count2, nobs1 + nobs2);
    let var = pooled * (1.0 - pooled) * (1.0 / nobs1 as f64 + 1.0 / nobs2 as f64);
    if var <= 0.0 || !var.is_finite() {
        return degenerate;
    }

    let z = (p1 - p2) / var.sqrt();
    let p_value = match alternative {
        Alternative::Larger => normal_sf(z),
        Alternative::Smaller => normal_cdf(z),
        Alternative::TwoSided => (2.0 * normal_sf(z.abs())).min(1.0),
    };
    ZTest {
        statistic: z,
        p_value,
    }
}

/// Cohen's h effect size between two proportions.
pub fn proportion_effect_size(p1: f64, p2: f64) -> f64 {
    2.0 * p1.clamp(0.0, 1.0).sqrt().asin() - 2.0 * p2.clamp(0.0, 1.0).sqrt().asin()
}

/// Required size of the first group for a normal-approximation test to reach
/// `power` at significance `alpha`, with `nobs2 = ratio * nobs1`.
///
/// Returns `None` when the effect size is zero (no finite sample suffices)
/// or any parameter is out of range.
pub fn required_sample_size(
    effect_size: f64,
    alpha: f64,
    power: f64,
    ratio: f64,
    alternative: Alternative,
) -> Option<f64> {
    let es = effect_size.abs();
    if es == 0.0 || !es.is_finite() || ratio <= 0.0 {
        return None;
    }
    if !(0.0 < alpha && alpha < 1.0) || !(0.0 < power && power < 1.0) {
        return None;
    }

    let tail = match alternative {
        Alternative::TwoSided => alpha / 2.0,
        Alternative::Larger | Alternative::Smaller => alpha,
    };
    let crit = normal_quantile(1.0 - tail);
    let z_power = normal_quantile(power);
    let effective = ((crit + z_power) / es).powi(2);
    Some(effective * (1.0 + 1.0 / ratio))
}
