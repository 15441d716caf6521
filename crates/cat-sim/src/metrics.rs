//! Aggregation of per-examinee results into overall and quintile-stratified
//! metrics, and the validation predicates the harness exists to check.

use crate::examinee::ExamineeResult;
use cat_core::Domain;
use serde::Serialize;
use std::collections::HashMap;

/// Minimum proportion of examinees meeting criteria to pass validation.
pub const EXIT_CRITERIA_PASS_RATE: f64 = 0.90;

/// Maximum absolute deviation of any non-empty quintile's RMSE from the
/// overall RMSE still considered "roughly constant across ability
/// quintiles" for exit-criteria purposes.
pub const RMSE_QUINTILE_TOLERANCE: f64 = 0.15;

/// Ability quintile boundaries, stratified by true (not estimated) theta to
/// avoid regression-to-the-mean artifacts. The outer two bands are
/// open-ended on their outward side.
pub const QUINTILE_BOUNDARIES: [(&str, f64, f64); 5] = [
    ("Very Low", -3.0, -1.2),
    ("Low", -1.2, -0.4),
    ("Average", -0.4, 0.4),
    ("High", 0.4, 1.2),
    ("Very High", 1.2, 3.0),
];

#[derive(Debug, Clone, Serialize)]
pub struct QuintileMetrics {
    pub label: String,
    pub theta_range: (f64, f64),
    pub n: usize,
    pub mean_items: f64,
    pub median_items: f64,
    pub mean_se: f64,
    pub mean_bias: f64,
    pub rmse: f64,
    pub convergence_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub n_examinees: usize,
    pub overall_mean_items: f64,
    pub overall_median_items: f64,
    pub overall_mean_se: f64,
    pub overall_mean_bias: f64,
    pub overall_rmse: f64,
    pub overall_convergence_rate: f64,
    pub quintile_metrics: Vec<QuintileMetrics>,
    pub stopping_reason_counts: HashMap<String, u32>,
    pub content_balance_rate: f64,
    /// Whether every non-empty quintile's RMSE stays within
    /// `RMSE_QUINTILE_TOLERANCE` of the overall RMSE.
    pub rmse_stable_across_quintiles: bool,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("item counts are always finite"));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn rmse(biases: &[f64]) -> f64 {
    if biases.is_empty() {
        0.0
    } else {
        (biases.iter().map(|b| b * b).sum::<f64>() / biases.len() as f64).sqrt()
    }
}

/// Whether every non-empty quintile's RMSE falls within
/// `RMSE_QUINTILE_TOLERANCE` of the overall RMSE, i.e. precision is roughly
/// constant rather than concentrated in one part of the ability range.
fn rmse_stable_across_quintiles(overall_rmse: f64, quintiles: &[QuintileMetrics]) -> bool {
    quintiles
        .iter()
        .filter(|q| q.n > 0)
        .all(|q| (q.rmse - overall_rmse).abs() <= RMSE_QUINTILE_TOLERANCE)
}

/// Aggregate a full run's examinee results into overall and quintile metrics,
/// plus the exit-criteria predicates the report renders.
///
/// `min_items_per_domain` is the same content-balance floor the engine's
/// stopping evaluator uses, reused here to check whether a session covered
/// every domain at or above it.
pub fn aggregate_results(results: &[ExamineeResult], min_items_per_domain: u32) -> SimulationResult {
    assert!(!results.is_empty(), "cannot aggregate an empty examinee list");

    let items: Vec<f64> = results.iter().map(|r| r.items_administered as f64).collect();
    let ses: Vec<f64> = results.iter().map(|r| r.final_se).collect();
    let biases: Vec<f64> = results.iter().map(|r| r.bias).collect();
    let converged_count = results.iter().filter(|r| r.converged).count();

    let mut stopping_reason_counts: HashMap<String, u32> = HashMap::new();
    for r in results {
        *stopping_reason_counts.entry(r.stopping_reason.clone()).or_insert(0) += 1;
    }

    let balanced_count = results
        .iter()
        .filter(|r| {
            Domain::ALL
                .iter()
                .all(|d| r.domain_coverage.get(d).copied().unwrap_or(0) >= min_items_per_domain)
        })
        .count();

    let overall_rmse = rmse(&biases);
    let quintile_metrics = compute_quintile_metrics(results);
    let rmse_stable_across_quintiles = rmse_stable_across_quintiles(overall_rmse, &quintile_metrics);

    SimulationResult {
        n_examinees: results.len(),
        overall_mean_items: mean(&items),
        overall_median_items: median(&items),
        overall_mean_se: mean(&ses),
        overall_mean_bias: mean(&biases),
        overall_rmse,
        overall_convergence_rate: converged_count as f64 / results.len() as f64,
        quintile_metrics,
        stopping_reason_counts,
        content_balance_rate: balanced_count as f64 / results.len() as f64,
        rmse_stable_across_quintiles,
    }
}

/// Stratify examinee results by true-theta quintile and compute the same
/// summary statistics within each band.
pub fn compute_quintile_metrics(results: &[ExamineeResult]) -> Vec<QuintileMetrics> {
    QUINTILE_BOUNDARIES
        .iter()
        .map(|(label, theta_min, theta_max)| {
            let in_band: Vec<&ExamineeResult> = results
                .iter()
                .filter(|r| {
                    if *label == "Very Low" {
                        r.true_theta < *theta_max
                    } else if *label == "Very High" {
                        r.true_theta >= *theta_min
                    } else {
                        r.true_theta >= *theta_min && r.true_theta < *theta_max
                    }
                })
                .collect();

            if in_band.is_empty() {
                return QuintileMetrics {
                    label: label.to_string(),
                    theta_range: (*theta_min, *theta_max),
                    n: 0,
                    mean_items: 0.0,
                    median_items: 0.0,
                    mean_se: 0.0,
                    mean_bias: 0.0,
                    rmse: 0.0,
                    convergence_rate: 0.0,
                };
            }

            let items: Vec<f64> = in_band.iter().map(|r| r.items_administered as f64).collect();
            let ses: Vec<f64> = in_band.iter().map(|r| r.final_se).collect();
            let biases: Vec<f64> = in_band.iter().map(|r| r.bias).collect();
            let converged = in_band.iter().filter(|r| r.converged).count();

            QuintileMetrics {
                label: label.to_string(),
                theta_range: (*theta_min, *theta_max),
                n: in_band.len(),
                mean_items: mean(&items),
                median_items: median(&items),
                mean_se: mean(&ses),
                mean_bias: mean(&biases),
                rmse: rmse(&biases),
                convergence_rate: converged as f64 / in_band.len() as f64,
            }
        })
        .collect()
}
