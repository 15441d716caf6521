//! The stopping evaluator: a pure function of current session state,
//! evaluating five rules in strict priority order.

use crate::domain::Domain;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Why the evaluator decided to stop, or that it is continuing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxItems,
    SeThreshold,
    ThetaStable,
    /// Surfaced by the session engine, not by this evaluator directly:
    /// the selector returned no item.
    ItemPoolExhausted,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::MaxItems => write!(f, "max_items"),
            StopReason::SeThreshold => write!(f, "se_threshold"),
            StopReason::ThetaStable => write!(f, "theta_stable"),
            StopReason::ItemPoolExhausted => write!(f, "item_pool_exhausted"),
        }
    }
}

/// Per-rule intermediate state, so callers can log and tests can assert
/// individual predicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingDetails {
    pub below_min_items: bool,
    pub at_or_above_max_items: bool,
    pub content_balanced: bool,
    pub content_balance_waived: bool,
    pub se_below_threshold: bool,
    pub theta_delta: Option<f64>,
    pub theta_stable: bool,
}

/// The evaluator's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoppingDecision {
    pub should_stop: bool,
    pub reason: Option<StopReason>,
    pub details: StoppingDetails,
}

/// `num_items` and domain coverage counts are `u32` at the call boundary, so
/// the only runtime-checkable input validation left is `theta_se`'s sign.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoppingInputError {
    #[error("theta_se must be non-negative, got {0}")]
    NegativeStandardError(String),
}

/// Evaluate the five stopping rules, in strict priority order; the first
/// matching rule fires.
#[allow(clippy::too_many_arguments)]
pub fn evaluate_stopping(
    theta_se: f64,
    num_items: u32,
    domain_coverage: &HashMap<Domain, u32>,
    theta_history: &[f64],
    min_items: u32,
    max_items: u32,
    min_items_per_domain: u32,
    content_balance_waiver_threshold: u32,
    min_domains_for_waiver: u32,
    se_threshold: f64,
    se_stabilization_threshold: f64,
    delta_theta_threshold: f64,
) -> Result<StoppingDecision, StoppingInputError> {
    if theta_se < 0.0 {
        return Err(StoppingInputError::NegativeStandardError(theta_se.to_string()));
    }

    // Rule 1: minimum items overrides everything.
    if num_items < min_items {
        return Ok(StoppingDecision {
            should_stop: false,
            reason: None,
            details: StoppingDetails {
                below_min_items: true,
                at_or_above_max_items: false,
                content_balanced: false,
                content_balance_waived: false,
                se_below_threshold: theta_se < se_threshold,
                theta_delta: theta_delta(theta_history),
                theta_stable: false,
            },
        });
    }

    // Rule 2: maximum items overrides rules 3-5.
    if num_items >= max_items {
        return Ok(StoppingDecision {
            should_stop: true,
            reason: Some(StopReason::MaxItems),
            details: StoppingDetails {
                below_min_items: false,
                at_or_above_max_items: true,
                content_balanced: false,
                content_balance_waived: false,
                se_below_threshold: theta_se < se_threshold,
                theta_delta: theta_delta(theta_history),
                theta_stable: false,
            },
        });
    }

    let content_balanced = Domain::ALL
        .iter()
        .all(|d| domain_coverage.get(d).copied().unwrap_or(0) >= min_items_per_domain);
    let domains_with_items = Domain::ALL
        .iter()
        .filter(|d| domain_coverage.get(d).copied().unwrap_or(0) > 0)
        .count() as u32;
    let content_balance_waived =
        num_items >= content_balance_waiver_threshold && domains_with_items >= min_domains_for_waiver;

    // Rule 3: content balance guard.
    if !content_balanced && !content_balance_waived {
        return Ok(StoppingDecision {
            should_stop: false,
            reason: None,
            details: StoppingDetails {
                below_min_items: false,
                at_or_above_max_items: false,
                content_balanced,
                content_balance_waived,
                se_below_threshold: theta_se < se_threshold,
                theta_delta: theta_delta(theta_history),
                theta_stable: false,
            },
        });
    }

    let se_below_threshold = theta_se < se_threshold;
    // Rule 4: SE threshold.
    if se_below_threshold {
        return Ok(StoppingDecision {
            should_stop: true,
            reason: Some(StopReason::SeThreshold),
            details: StoppingDetails {
                below_min_items: false,
                at_or_above_max_items: false,
                content_balanced,
                content_balance_waived,
                se_below_threshold,
                theta_delta: theta_delta(theta_history),
                theta_stable: false,
            },
        });
    }

    // Rule 5: theta stabilisation.
    let delta = theta_delta(theta_history);
    let theta_stable = delta
        .map(|d| d < delta_theta_threshold && theta_se < se_stabilization_threshold)
        .unwrap_or(false);
    if theta_stable {
        return Ok(StoppingDecision {
            should_stop: true,
            reason: Some(StopReason::ThetaStable),
            details: StoppingDetails {
                below_min_items: false,
                at_or_above_max_items: false,
                content_balanced,
                content_balance_waived,
                se_below_threshold,
                theta_delta: delta,
                theta_stable,
            },
        });
    }

    Ok(StoppingDecision {
        should_stop: false,
        reason: None,
        details: StoppingDetails {
            below_min_items: false,
            at_or_above_max_items: false,
            content_balanced,
            content_balance_waived,
            se_below_threshold,
            theta_delta: delta,
            theta_stable: false,
        },
    })
}

fn theta_delta(history: &[f64]) -> Option<f64> {
    if history.len() < 2 {
        return None;
    }
    let last = history[history.len() - 1];
    let prev = history[history.len() - 2];
    Some((last - prev).abs())
}
