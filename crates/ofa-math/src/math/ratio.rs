//! Zero-guarded ratios.
//!
//! Every rate the metrics engine reports (stage conversion, average order
//! value, retention share) divides by a count that may legitimately be zero
//! on a filtered view. These helpers return `0.0` in that case so no NaN or
//! infinity ever reaches a renderer.

/// `numerator / denominator`, or `0.0` when the denominator is zero or the
/// result is not finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// Ratio of two counts under the same zero guard.
pub fn count_ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert_eq!(count_ratio(5, 0), 0.0);
        assert_eq!(count_ratio(0, 0), 0.0);
    }

    #[test]
    fn non_finite_inputs_are_zero() {
        assert_eq!(safe_ratio(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_ratio(1.0, f64::INFINITY), 0.0);
        assert_eq!(safe_ratio(f64::MAX, f64::MIN_POSITIVE), 0.0);
    }

    #[test]
    fn plain_division() {
        assert_eq!(count_ratio(1, 2), 0.5);
        assert_eq!(safe_ratio(150.0, 3.0), 50.0);
    }

    proptest! {
        #[test]
        fn count_ratio_is_always_finite(n in any::<u64>(), d in any::<u64>()) {
            let r = count_ratio(n, d);
            prop_assert!(r.is_finite());
            prop_assert!(r >= 0.0);
        }

        #[test]
        fn count_ratio_bounded_when_numerator_smaller(d in 1u64..1_000_000, frac in 0.0f64..=1.0) {
            let n = (d as f64 * frac).floor() as u64;
            let r = count_ratio(n, d);
            prop_assert!((0.0..=1.0).contains(&r));
        }
    }
}
