//! The explicit, immutable tunable bundle consumed by the engine.
//!
//! Every tunable the engine consumes has a field here, including the
//! scoring and readiness thresholds. `CatConfig::default()` reproduces the
//! documented default for each one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Target composition weight for each cognitive domain.
pub type DomainWeights = HashMap<String, f64>;

/// The six domain tags, in the canonical order used wherever a full domain
/// map is iterated.
pub const DOMAIN_ORDER: [&str; 6] = ["pattern", "logic", "verbal", "spatial", "math", "memory"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatConfig {
    /// Minimum items before any stopping rule may fire.
    pub min_items: u32,
    /// Hard upper bound on test length.
    pub max_items: u32,
    /// Posterior SE below which the test may stop.
    pub se_threshold: f64,
    /// SE below which theta-stabilisation may fire.
    pub se_stabilization_threshold: f64,
    /// Inter-item |delta theta| below which theta is considered stable.
    pub delta_theta_threshold: f64,
    /// Content-balance floor for each domain.
    pub min_items_per_domain: u32,
    /// Items above which imbalance is accepted.
    pub content_balance_waiver_threshold: u32,
    /// Distinct domains required to trigger the waiver.
    pub min_domains_for_waiver: u32,
    /// Top-K set size for exposure control.
    pub randomesque_k: usize,
    /// Target composition across the six domains; must sum to 1.0.
    pub domain_weights: DomainWeights,
    /// Calibration quality gate: maximum allowed SE on difficulty for a
    /// "well-calibrated" item.
    pub max_se_difficulty: f64,
    /// Calibration quality gate: maximum allowed SE on discrimination.
    pub max_se_discrimination: f64,
    /// Minimum well-calibrated items required per domain for readiness.
    pub min_calibrated_items_per_domain: u32,
    /// Minimum well-calibrated items required in each difficulty band.
    pub min_items_per_band: u32,
    /// theta_se above which a confidence interval is omitted from scoring
    /// ("no CI once the posterior is no tighter than the prior").
    pub reliability_floor: f64,
}

impl Default for CatConfig {
    fn default() -> Self {
        let mut domain_weights = HashMap::new();
        domain_weights.insert("pattern".to_string(), 0.22);
        domain_weights.insert("logic".to_string(), 0.20);
        domain_weights.insert("verbal".to_string(), 0.19);
        domain_weights.insert("spatial".to_string(), 0.16);
        domain_weights.insert("math".to_string(), 0.13);
        domain_weights.insert("memory".to_string(), 0.10);

        CatConfig {
            min_items: 8,
            max_items: 15,
            se_threshold: 0.30,
            se_stabilization_threshold: 0.35,
            delta_theta_threshold: 0.03,
            min_items_per_domain: 1,
            content_balance_waiver_threshold: 10,
            min_domains_for_waiver: 4,
            randomesque_k: 5,
            domain_weights,
            max_se_difficulty: 0.30,
            max_se_discrimination: 0.20,
            min_calibrated_items_per_domain: 20,
            min_items_per_band: 5,
            reliability_floor: 1.0,
        }
    }
}

impl CatConfig {
    /// Load a config from a JSON file. Falling back to defaults for any
    /// field the file omits by deserializing over a default-initialized
    /// value is not attempted here — callers get an explicit error instead.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::validate::ValidationError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| crate::validate::ValidationError::IoError(e.to_string()))?;
        serde_json::from_str(&text)
            .map_err(|e| crate::validate::ValidationError::ParseError(e.to_string()))
    }
}
