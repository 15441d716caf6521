//! Synthetic item-bank generation for Monte Carlo simulation runs.
//!
//! Parameters are drawn from the distributions real operational item banks
//! tend to follow (Lord, 1980): discrimination log-normal, difficulty
//! normal, both clipped to the range the engine treats as well-formed.

use cat_common::ItemId;
use cat_core::{Domain, Item, QualityFlag};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, LogNormal, Normal};

const DISCRIMINATION_LOGNORMAL_MEAN: f64 = 0.0;
const DISCRIMINATION_LOGNORMAL_SD: f64 = 0.3;
const DISCRIMINATION_MIN: f64 = 0.5;
const DISCRIMINATION_MAX: f64 = 2.5;
const DIFFICULTY_NORMAL_MEAN: f64 = 0.0;
const DIFFICULTY_NORMAL_SD: f64 = 1.0;
const DIFFICULTY_MIN: f64 = -3.0;
const DIFFICULTY_MAX: f64 = 3.0;

/// Generate a synthetic, fully calibrated item bank: `n_per_domain` items in
/// each of the six cognitive domains, with `a ~ LogNormal(0, 0.3)` clipped
/// to `[0.5, 2.5]` and `b ~ Normal(0, 1)` clipped to `[-3.0, 3.0]`.
///
/// Items are generated already `active`, `QualityFlag::Normal`, and with
/// both standard errors set to a small constant, so the bank is immediately
/// usable by the selector and passes the readiness evaluator's calibration
/// gate outright.
pub fn generate_item_bank(n_per_domain: u32, seed: u64) -> Vec<Item> {
    let mut rng = StdRng::seed_from_u64(seed);
    let discrimination_dist = LogNormal::new(DISCRIMINATION_LOGNORMAL_MEAN, DISCRIMINATION_LOGNORMAL_SD)
        .unwrap_or_else(|_| LogNormal::new(0.0, 0.3).expect("fallback LogNormal params are always valid"));
    let difficulty_dist = Normal::new(DIFFICULTY_NORMAL_MEAN, DIFFICULTY_NORMAL_SD)
        .unwrap_or_else(|_| Normal::new(0.0, 1.0).expect("fallback Normal params are always valid"));

    let mut items = Vec::with_capacity(Domain::ALL.len() * n_per_domain as usize);
    let mut next_id: u64 = 1;

    for domain in Domain::ALL {
        for _ in 0..n_per_domain {
            let a = discrimination_dist
                .sample(&mut rng)
                .clamp(DISCRIMINATION_MIN, DISCRIMINATION_MAX);
            let b = difficulty_dist.sample(&mut rng).clamp(DIFFICULTY_MIN, DIFFICULTY_MAX);

            items.push(Item {
                id: ItemId::from(format!("sim-{next_id}")),
                domain,
                discrimination: a,
                difficulty: b,
                se_discrimination: Some(0.05),
                se_difficulty: Some(0.05),
                active: true,
                quality: QualityFlag::Normal,
            });
            next_id += 1;
        }
    }

    tracing::info!(
        total_items = items.len(),
        n_per_domain,
        "generated synthetic item bank"
    );

    items
}
