//! Expected a posteriori (EAP) ability estimation.
//!
//! Integrates the posterior over a fixed quadrature grid rather than a
//! closed-form expression: the likelihood is a product of per-item 2PL
//! terms and has no conjugate prior, so quadrature is the standard way to
//! get a numerically stable posterior mean and standard deviation.

use super::irt::probability_2pl;
use super::normal::standard_normal_log_pdf;
use super::stable::log_sum_exp;

/// Lower bound of the quadrature grid.
pub const GRID_MIN: f64 = -4.0;
/// Upper bound of the quadrature grid.
pub const GRID_MAX: f64 = 4.0;
/// Node count; well above the spec's 40-node floor for headroom on curvature
/// near strongly-informative items.
pub const GRID_POINTS: usize = 81;

/// One administered response as seen by the estimator: discrimination,
/// difficulty, and whether the response was correct.
#[derive(Debug, Clone, Copy)]
pub struct ResponseRecord {
    pub a: f64,
    pub b: f64,
    pub correct: bool,
}

fn quadrature_grid() -> [f64; GRID_POINTS] {
    let mut grid = [0.0; GRID_POINTS];
    let step = (GRID_MAX - GRID_MIN) / (GRID_POINTS as f64 - 1.0);
    for (i, slot) in grid.iter_mut().enumerate() {
        *slot = GRID_MIN + step * i as f64;
    }
    grid
}

/// Posterior mean and standard deviation of theta under a Normal(0, 1)
/// prior, given the administered response history.
///
/// For an empty history, returns `(prior_theta, 1.0)` — the prior is
/// returned unchanged since there is no likelihood to update it with.
pub fn eap_estimate(responses: &[ResponseRecord], prior_theta: f64) -> (f64, f64) {
    if responses.is_empty() {
        return (prior_theta, 1.0);
    }

    let grid = quadrature_grid();
    let mut log_post = [0.0f64; GRID_POINTS];
    for (i, theta) in grid.iter().enumerate() {
        let mut log_lik = standard_normal_log_pdf(*theta);
        for r in responses {
            let p = probability_2pl(*theta, r.a, r.b);
            let term = if r.correct { p } else { 1.0 - p };
            log_lik += term.max(f64::MIN_POSITIVE).ln();
        }
        log_post[i] = log_lik;
    }

    let log_z = log_sum_exp(&log_post);
    let weights: Vec<f64> = log_post.iter().map(|lp| (lp - log_z).exp()).collect();

    let mean: f64 = weights
        .iter()
        .zip(grid.iter())
        .map(|(w, theta)| w * theta)
        .sum();
    let variance: f64 = weights
        .iter()
        .zip(grid.iter())
        .map(|(w, theta)| w * (theta - mean).powi(2))
        .sum();

    (mean, variance.max(0.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_returns_prior() {
        let (theta, se) = eap_estimate(&[], 0.4);
        assert_eq!(theta, 0.4);
        assert_eq!(se, 1.0);
    }

    #[test]
    fn all_correct_pulls_theta_upward() {
        let responses: Vec<ResponseRecord> = (0..8)
            .map(|_| ResponseRecord { a: 1.2, b: 0.0, correct: true })
            .collect();
        let (theta, se) = eap_estimate(&responses, 0.0);
        assert!(theta > 0.5);
        assert!(se > 0.0 && se < 1.0);
    }

    #[test]
    fn all_incorrect_pulls_theta_downward() {
        let responses: Vec<ResponseRecord> = (0..8)
            .map(|_| ResponseRecord { a: 1.2, b: 0.0, correct: false })
            .collect();
        let (theta, _se) = eap_estimate(&responses, 0.0);
        assert!(theta < -0.5);
    }

    #[test]
    fn standard_error_shrinks_with_more_informative_responses() {
        let few: Vec<ResponseRecord> = (0..2)
            .map(|_| ResponseRecord { a: 1.0, b: 0.0, correct: true })
            .collect();
        let many: Vec<ResponseRecord> = (0..14)
            .flat_map(|i| {
                [ResponseRecord {
                    a: 1.3,
                    b: 0.0,
                    correct: i % 2 == 0,
                }]
            })
            .collect();
        let (_t1, se_few) = eap_estimate(&few, 0.0);
        let (_t2, se_many) = eap_estimate(&many, 0.0);
        assert!(se_many < se_few);
    }

    #[test]
    fn grid_has_at_least_forty_nodes_spanning_plus_minus_four() {
        let grid = quadrature_grid();
        assert!(grid.len() >= 40);
        assert_eq!(grid[0], GRID_MIN);
        assert_eq!(grid[grid.len() - 1], GRID_MAX);
    }
}
