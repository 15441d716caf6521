//! Item selection: content-balance prefilter, maximum Fisher information
//! ranking, and randomesque top-K exposure control.

use crate::domain::Domain;
use crate::item::Item;
use cat_common::ItemId;
use cat_math::fisher_information_2pl;
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Inputs the selector needs beyond the eligible pool itself.
pub struct SelectorInput<'a> {
    pub theta: f64,
    pub administered: &'a HashSet<ItemId>,
    pub domain_coverage: &'a HashMap<Domain, u32>,
    pub domain_weights: &'a HashMap<String, f64>,
    pub min_items_per_domain: u32,
    pub randomesque_k: usize,
}

/// Select the next item to administer, or `None` if the pool is empty
/// after filtering.
///
/// All stages preserve insertion order where deterministic; ties are
/// broken by item id ascending.
pub fn select_next_item<R: Rng>(
    eligible: &[Item],
    input: &SelectorInput,
    rng: &mut R,
) -> Option<Item> {
    // 1. Filter: remove administered items and items with missing/invalid
    // calibration. `eligible` is assumed to already reflect the pool view's
    // per-user history filter; this stage only removes items administered
    // within the current session and malformed parameters as a defensive
    // second check.
    let mut candidates: Vec<&Item> = eligible
        .iter()
        .filter(|item| !input.administered.contains(&item.id))
        .filter(|item| item.discrimination.is_finite() && item.discrimination > 0.0)
        .filter(|item| item.difficulty.is_finite())
        .collect();

    if candidates.is_empty() {
        return None;
    }

    // 2. Content balance (hard constraint).
    let deficient_domains: HashSet<Domain> = input
        .domain_weights
        .keys()
        .filter_map(|d| d.parse::<Domain>().ok())
        .filter(|domain| {
            let covered = input.domain_coverage.get(domain).copied().unwrap_or(0);
            covered < input.min_items_per_domain
        })
        .collect();

    if !deficient_domains.is_empty() {
        let restricted: Vec<&Item> = candidates
            .iter()
            .filter(|item| deficient_domains.contains(&item.domain))
            .copied()
            .collect();
        if !restricted.is_empty() {
            candidates = restricted;
        }
        // else: restriction would yield an empty set, fall back to the
        // full filtered pool (content balance is best-effort).
    }

    // 3. Information scoring.
    let mut scored: Vec<(&Item, f64)> = candidates
        .into_iter()
        .map(|item| {
            let info = fisher_information_2pl(input.theta, item.discrimination, item.difficulty);
            (item, info)
        })
        .collect();

    // 4. Top-K randomesque: sort by information descending, ties by id
    // ascending, take the first K, sample one uniformly.
    scored.sort_by(|(a, info_a), (b, info_b)| {
        info_b
            .partial_cmp(info_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    let k = input.randomesque_k.max(1).min(scored.len());
    let top_k = &scored[..k];
    let pick = if k == 1 {
        0
    } else {
        rng.random_range(0..k)
    };
    Some(top_k[pick].0.clone())
}
