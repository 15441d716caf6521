//! Converts an ability estimate into the reported IQ-scale score: theta to
//! IQ, IQ to percentile, and a confidence interval when the estimate is
//! reliable enough to report one.

use cat_math::{standard_normal_cdf, standard_normal_quantile};

const IQ_MEAN: f64 = 100.0;
const IQ_SD: f64 = 15.0;
const IQ_MIN: f64 = 40.0;
const IQ_MAX: f64 = 200.0;

/// The reported score for a finalized session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub iq: f64,
    pub percentile: f64,
    pub confidence_interval: Option<(f64, f64)>,
}

/// `IQ = round(100 + 15*theta)` clamped to `[40, 200]`; `percentile` is the
/// standard normal CDF at `(IQ - 100) / 15`, scaled to `0..100`; the
/// confidence interval at `confidence` (e.g. `0.95`) is reported only when
/// `theta_se` is finite and at or below `reliability_floor` — a posterior
/// no tighter than the prior has nothing useful to bound.
pub fn score_session(theta: f64, theta_se: f64, confidence: f64, reliability_floor: f64) -> Score {
    let iq_raw = IQ_MEAN + IQ_SD * theta;
    let iq = iq_raw.round().clamp(IQ_MIN, IQ_MAX);

    let percentile = standard_normal_cdf((iq - IQ_MEAN) / IQ_SD) * 100.0;

    let confidence_interval = if theta_se.is_finite() && theta_se <= reliability_floor {
        let se_iq = IQ_SD * theta_se;
        let z = standard_normal_quantile((1.0 + confidence) / 2.0);
        Some((iq - z * se_iq, iq + z * se_iq))
    } else {
        None
    };

    Score {
        iq,
        percentile,
        confidence_interval,
    }
}
