//! Two-parameter logistic (2PL) item response model.

/// Stable sigmoid: splits on the sign of the logit so that magnitudes of
/// 50+ neither overflow nor underflow, and the result stays in `[0, 1]`
/// across the full representable range of `x`.
fn stable_sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

/// `P(correct | theta, a, b) = 1 / (1 + exp(-a*(theta - b)))`.
///
/// Returns `NaN` if `a` is not finite and positive, or if `theta`/`b` are
/// not finite.
pub fn probability_2pl(theta: f64, a: f64, b: f64) -> f64 {
    if !a.is_finite() || a <= 0.0 || !theta.is_finite() || !b.is_finite() {
        return f64::NAN;
    }
    stable_sigmoid(a * (theta - b))
}

/// Fisher information `I(theta; a, b) = a^2 * P * (1 - P)`.
///
/// Non-negative everywhere, maximised at `theta == b` with value `a^2/4`,
/// symmetric about `b`, and decaying to zero as `|theta - b|` grows.
/// Returns `NaN` for `a <= 0` or non-finite inputs, matching `probability_2pl`.
pub fn fisher_information_2pl(theta: f64, a: f64, b: f64) -> f64 {
    let p = probability_2pl(theta, a, b);
    if p.is_nan() {
        return f64::NAN;
    }
    a * a * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn probability_at_b_is_one_half() {
        let p = probability_2pl(1.0, 1.3, 1.0);
        assert!(approx_eq(p, 0.5, 1e-12));
    }

    #[test]
    fn probability_stays_in_unit_interval_for_extreme_logits() {
        let p_hi = probability_2pl(100.0, 2.0, -3.0);
        let p_lo = probability_2pl(-100.0, 2.0, 3.0);
        assert!(p_hi.is_finite() && p_hi <= 1.0 && p_hi > 0.99);
        assert!(p_lo.is_finite() && p_lo >= 0.0 && p_lo < 0.01);
    }

    #[test]
    fn probability_rejects_non_positive_discrimination() {
        assert!(probability_2pl(0.0, 0.0, 0.0).is_nan());
        assert!(probability_2pl(0.0, -1.0, 0.0).is_nan());
    }

    #[test]
    fn fisher_information_peaks_at_difficulty() {
        let a = 1.8;
        let b = 0.3;
        let peak = fisher_information_2pl(b, a, b);
        assert!(approx_eq(peak, a * a / 4.0, 1e-9));
        for d in [0.1, 0.5, 1.2, 3.0] {
            assert!(fisher_information_2pl(b + d, a, b) < peak);
        }
    }

    #[test]
    fn fisher_information_is_symmetric_about_difficulty() {
        let a = 1.2;
        let b = -0.5;
        for d in [0.1, 0.7, 2.0] {
            let hi = fisher_information_2pl(b + d, a, b);
            let lo = fisher_information_2pl(b - d, a, b);
            assert!((hi - lo).abs() < 1e-9);
        }
    }

    #[test]
    fn fisher_information_is_non_negative_and_rejects_bad_discrimination() {
        assert!(fisher_information_2pl(0.4, 1.1, 0.0) >= 0.0);
        assert!(fisher_information_2pl(0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn fisher_information_decays_away_from_difficulty() {
        let a = 1.0;
        let b = 0.0;
        let near = fisher_information_2pl(0.2, a, b);
        let far = fisher_information_2pl(5.0, a, b);
        assert!(far < near);
        assert!(far < 1e-3);
    }
}
