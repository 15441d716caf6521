//! Shared fixtures for the end-to-end integration tests: a synthetic
//! calibrated bank and a 2PL Bernoulli response generator, independent of
//! the simulation crate so this crate's own test suite has no reverse
//! dependency on it.

use cat_core::{Domain, Item, QualityFlag};
use cat_math::probability_2pl;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, LogNormal, Normal};

/// Build a calibrated item bank with `n_per_domain` items in each of the
/// six domains: `a ~ LogNormal(0, 0.3)` clipped to `[0.5, 2.5]`, `b ~
/// Normal(0, 1)` clipped to `[-3.0, 3.0]`.
pub fn generate_bank(n_per_domain: u32, seed: u64) -> Vec<Item> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let a_dist = LogNormal::new(0.0, 0.3).expect("LogNormal(0, 0.3) is always valid");
    let b_dist = Normal::new(0.0, 1.0).expect("Normal(0, 1) is always valid");

    let mut items = Vec::with_capacity(Domain::ALL.len() * n_per_domain as usize);
    let mut next_id = 1u64;
    for domain in Domain::ALL {
        for _ in 0..n_per_domain {
            let a = a_dist.sample(&mut rng).clamp(0.5, 2.5);
            let b = b_dist.sample(&mut rng).clamp(-3.0, 3.0);
            items.push(Item {
                id: cat_common::ItemId::from(format!("bank-{next_id}")),
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
    items
}

/// Draw a Bernoulli response from the 2PL probability of a correct answer.
pub fn respond_2pl<R: Rng>(true_theta: f64, a: f64, b: f64, rng: &mut R) -> bool {
    rng.random::<f64>() < probability_2pl(true_theta, a, b)
}
