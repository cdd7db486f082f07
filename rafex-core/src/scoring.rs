//! Turning an unbounded rod angle into a bounded response error.
//!
//! A rod looks the same after half a turn, so 0°, 180° and 360° are all the
//! same orientation and no response can be more than 90° off.

/// Reduces `raw_error_deg` into (-90, 90] the way task data has always been
/// scored: drop whole turns above 360°, then fold the half turns.
///
/// That sequence leaves large negative errors unreduced; those fall through
/// to [`wrap_half_turn`], which agrees with it everywhere it does reduce.
pub fn bounded_error(raw_error_deg: f64) -> f64 {
    let mut error = raw_error_deg;
    if error > 360.0 {
        error -= 360.0 * (error / 360.0).floor();
    }
    if error > 180.0 {
        error -= 180.0;
    }
    if error > 90.0 {
        error -= 180.0;
    }
    if error > -90.0 && error <= 90.0 {
        error
    } else {
        wrap_half_turn(raw_error_deg)
    }
}

/// Closed form of the half-turn fold: `raw` modulo 180 into (-90, 90].
pub fn wrap_half_turn(raw_error_deg: f64) -> f64 {
    let folded = raw_error_deg.rem_euclid(180.0);
    if folded > 90.0 { folded - 180.0 } else { folded }
}

/// Keypresses needed to turn the rod from `from_deg` to `to_deg` without detours.
pub fn min_adjustments(from_deg: f64, to_deg: f64, step_deg: f64) -> f64 {
    (from_deg - to_deg).abs() / step_deg
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn in_range(e: f64) -> bool {
        e > -90.0 && e <= 90.0
    }

    #[test]
    fn folds_half_turns() {
        assert_eq!(bounded_error(0.0), 0.0);
        assert_eq!(bounded_error(180.0), 0.0);
        assert_eq!(bounded_error(90.0), 90.0);
        assert_eq!(bounded_error(91.0), -89.0);
        assert_eq!(bounded_error(-90.0), 90.0);
        assert_eq!(bounded_error(-30.0), -30.0);
    }

    #[test]
    fn drops_full_turns() {
        assert!((bounded_error(725.0) - 5.0).abs() < EPS);
        assert!((bounded_error(360.0 * 40.0 + 100.0) - -80.0).abs() < EPS);
    }

    #[test]
    fn large_negative_errors_are_bounded() {
        assert!((bounded_error(-725.0) - -5.0).abs() < EPS);
        assert!((bounded_error(-270.0) - 90.0).abs() < EPS);
        assert!(in_range(bounded_error(-1.0e9 - 0.3)));
    }

    #[test]
    fn bounded_and_invariant_under_half_turns() {
        let mut raw = -1234.5;
        while raw < 1234.5 {
            let e = bounded_error(raw);
            assert!(in_range(e), "{raw} -> {e}");
            for k in -4..=4 {
                let shifted = bounded_error(raw + 180.0 * k as f64);
                assert!((shifted - e).abs() < 1e-6, "{raw} + {k}*180 -> {shifted} vs {e}");
            }
            raw += 7.3;
        }
    }

    #[test]
    fn stepwise_and_closed_form_agree() {
        let mut raw = -720.0;
        while raw <= 1440.0 {
            assert!((bounded_error(raw) - wrap_half_turn(raw)).abs() < 1e-6, "{raw}");
            raw += 2.5;
        }
    }

    #[test]
    fn minimum_adjustments() {
        assert!((min_adjustments(0.0, 90.0, 0.2) - 450.0).abs() < EPS);
        assert_eq!(min_adjustments(100.0, 90.0, 1.0), 10.0);
        assert_eq!(min_adjustments(90.0, 90.0, 0.2), 0.0);
    }
}
