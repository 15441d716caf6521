//! Readiness evaluator: whether the calibrated item pool has enough
//! well-calibrated items, across all six domains and three difficulty bands,
//! to support CAT.
//!
//! Band boundaries are `easy: b < -1.0`, `medium: -1.0 <= b <= 1.0`
//! (inclusive on both ends), `hard: b > 1.0`.

use crate::domain::Domain;
use crate::item::{Item, QualityFlag};
use cat_config::CatConfig;
use serde::{Deserialize, Serialize};

/// Per-domain calibration counts and pass/fail reasons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReadiness {
    pub domain: Domain,
    pub is_ready: bool,
    /// Items with both SEs present, regardless of their magnitude.
    pub total_calibrated: u32,
    /// The threshold-passing subset of `total_calibrated`.
    pub well_calibrated: u32,
    pub easy_count: u32,
    pub medium_count: u32,
    pub hard_count: u32,
    pub reasons: Vec<String>,
}

/// Thresholds the evaluation was run against, echoed back for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadinessThresholds {
    pub min_calibrated_items_per_domain: u32,
    pub max_se_difficulty: f64,
    pub max_se_discrimination: f64,
    pub min_items_per_band: u32,
}

/// Global readiness result: ready iff every domain is ready.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub is_globally_ready: bool,
    pub domains: Vec<DomainReadiness>,
    pub summary: String,
    pub thresholds: ReadinessThresholds,
}

/// Evaluate CAT readiness over the full item catalogue.
///
/// `total_calibrated` counts any item with both SEs present; `well_calibrated`
/// is the subset additionally passing the SE thresholds. Bands: `easy: b <
/// -1.0`, `medium: -1.0 <= b <= 1.0`, `hard: b > 1.0` — boundary values
/// belong to `medium`.
pub fn evaluate_readiness(items: &[Item], config: &CatConfig) -> ReadinessReport {
    let thresholds = ReadinessThresholds {
        min_calibrated_items_per_domain: config.min_calibrated_items_per_domain,
        max_se_difficulty: config.max_se_difficulty,
        max_se_discrimination: config.max_se_discrimination,
        min_items_per_band: config.min_items_per_band,
    };

    let domains: Vec<DomainReadiness> = Domain::ALL
        .iter()
        .map(|domain| evaluate_domain(*domain, items, &thresholds))
        .collect();

    let is_globally_ready = domains.iter().all(|d| d.is_ready);
    let ready_count = domains.iter().filter(|d| d.is_ready).count();
    let summary = format!("{ready_count}/{} domains ready for CAT", domains.len());

    ReadinessReport {
        is_globally_ready,
        domains,
        summary,
        thresholds,
    }
}

fn is_calibrated(item: &Item) -> bool {
    item.active
        && item.quality == QualityFlag::Normal
        && item.se_discrimination.is_some()
        && item.se_difficulty.is_some()
}

fn is_well_calibrated(item: &Item, thresholds: &ReadinessThresholds) -> bool {
    is_calibrated(item)
        && item.difficulty.is_finite()
        && item.se_difficulty.unwrap() <= thresholds.max_se_difficulty
        && item.se_discrimination.unwrap() <= thresholds.max_se_discrimination
}

fn evaluate_domain(domain: Domain, items: &[Item], thresholds: &ReadinessThresholds) -> DomainReadiness {
    let domain_items: Vec<&Item> = items.iter().filter(|i| i.domain == domain).collect();

    let total_calibrated = domain_items.iter().filter(|i| is_calibrated(i)).count() as u32;

    let well_calibrated_items: Vec<&&Item> = domain_items
        .iter()
        .filter(|i| is_well_calibrated(i, thresholds))
        .collect();
    let well_calibrated = well_calibrated_items.len() as u32;

    let easy_count = well_calibrated_items.iter().filter(|i| i.difficulty < -1.0).count() as u32;
    let medium_count = well_calibrated_items
        .iter()
        .filter(|i| (-1.0..=1.0).contains(&i.difficulty))
        .count() as u32;
    let hard_count = well_calibrated_items.iter().filter(|i| i.difficulty > 1.0).count() as u32;

    let mut reasons = Vec::new();
    let mut is_ready = true;

    if well_calibrated < thresholds.min_calibrated_items_per_domain {
        is_ready = false;
        reasons.push(format!(
            "Insufficient well-calibrated items: {well_calibrated}/{}",
            thresholds.min_calibrated_items_per_domain
        ));
    }
    if easy_count < thresholds.min_items_per_band {
        is_ready = false;
        reasons.push(format!(
            "Insufficient easy items (b < -1.0): {easy_count}/{}",
            thresholds.min_items_per_band
        ));
    }
    if medium_count < thresholds.min_items_per_band {
        is_ready = false;
        reasons.push(format!(
            "Insufficient medium items (-1.0 <= b <= 1.0): {medium_count}/{}",
            thresholds.min_items_per_band
        ));
    }
    if hard_count < thresholds.min_items_per_band {
        is_ready = false;
        reasons.push(format!(
            "Insufficient hard items (b > 1.0): {hard_count}/{}",
            thresholds.min_items_per_band
        ));
    }

    DomainReadiness {
        domain,
        is_ready,
        total_calibrated,
        well_calibrated,
        easy_count,
        medium_count,
        hard_count,
        reasons,
    }
}
