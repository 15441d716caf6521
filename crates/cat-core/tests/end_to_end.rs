//! Full-session integration tests driving `CatEngine` end to end, plus two
//! pure evaluator-level checks whose scenarios are naturally expressed
//! against `evaluate_stopping` directly rather than through a whole session.

mod common;

use cat_common::UserId;
use cat_config::CatConfig;
use cat_core::{evaluate_stopping, CatEngine, Domain, InMemoryItemPool, StopReason, SubmitOutcome};
use common::{generate_bank, respond_2pl};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::HashMap;

struct SessionOutcome {
    theta: f64,
    theta_se: f64,
    items_administered: usize,
    stop_reason: StopReason,
    domain_coverage: HashMap<Domain, u32>,
}

/// Run one examinee to completion, drawing responses against `true_theta`
/// via the 2PL model.
fn run_to_completion(
    engine: &mut CatEngine<InMemoryItemPool>,
    true_theta: f64,
    prior_theta: f64,
    response_rng: &mut StdRng,
) -> SessionOutcome {
    let begin = engine.begin_session(UserId::from("examinee"), Some(prior_theta));
    let mut next_item = begin.first_item;
    let mut outcome = None;

    loop {
        let item = match next_item.take() {
            Some(item) => item,
            None => {
                outcome = Some((StopReason::ItemPoolExhausted, begin.theta, begin.theta_se, 0));
                break;
            }
        };
        let correct = respond_2pl(true_theta, item.discrimination, item.difficulty, response_rng);
        match engine
            .submit_response(&begin.session_id, item.id, correct, None)
            .expect("fixture sessions never submit duplicate or unknown items")
        {
            SubmitOutcome::NextQuestion { item, .. } => next_item = Some(item),
            SubmitOutcome::Completed {
                theta,
                theta_se,
                items_administered,
                stop_reason,
                ..
            } => {
                outcome = Some((stop_reason, theta, theta_se, items_administered));
                break;
            }
        }
    }

    let (stop_reason, theta, theta_se, items_administered) = outcome.expect("loop always assigns an outcome");
    let domain_coverage = engine
        .session(&begin.session_id)
        .map(|s| s.domain_coverage.clone())
        .unwrap_or_else(cat_core::empty_coverage);

    SessionOutcome {
        theta,
        theta_se,
        items_administered,
        stop_reason,
        domain_coverage,
    }
}

/// Run a fixed number of items through the engine regardless of response
/// correctness, alternating true/false so no consistent ability signal
/// ever emerges. Returns the outcome at whichever point the engine stops,
/// or after `max_attempts` submissions if it never does.
fn run_alternating(engine: &mut CatEngine<InMemoryItemPool>, max_attempts: u32) -> SessionOutcome {
    let begin = engine.begin_session(UserId::from("noisy-examinee"), None);
    let mut next_item = begin.first_item;
    let mut alternate = true;
    let mut outcome = None;

    for _ in 0..max_attempts {
        let item = match next_item.take() {
            Some(item) => item,
            None => {
                outcome = Some((StopReason::ItemPoolExhausted, begin.theta, begin.theta_se, 0));
                break;
            }
        };
        alternate = !alternate;
        match engine
            .submit_response(&begin.session_id, item.id, alternate, None)
            .expect("fixture sessions never submit duplicate or unknown items")
        {
            SubmitOutcome::NextQuestion { item, .. } => next_item = Some(item),
            SubmitOutcome::Completed {
                theta,
                theta_se,
                items_administered,
                stop_reason,
                ..
            } => {
                outcome = Some((stop_reason, theta, theta_se, items_administered));
                break;
            }
        }
    }

    let (stop_reason, theta, theta_se, items_administered) =
        outcome.expect("alternating responses should finalize within max_attempts");
    let domain_coverage = engine
        .session(&begin.session_id)
        .map(|s| s.domain_coverage.clone())
        .unwrap_or_else(cat_core::empty_coverage);

    SessionOutcome {
        theta,
        theta_se,
        items_administered,
        stop_reason,
        domain_coverage,
    }
}

#[test]
fn fast_converger_stops_on_se_threshold_near_true_theta() {
    let config = CatConfig::default();
    let bank = generate_bank(50, 42);
    let pool = InMemoryItemPool::new(bank);
    let mut engine = CatEngine::new(config, pool, 42);
    let mut response_rng = StdRng::seed_from_u64(42);

    let outcome = run_to_completion(&mut engine, 0.0, 0.0, &mut response_rng);

    assert!(
        outcome.items_administered >= 8 && outcome.items_administered <= 12,
        "expected 8-12 items, got {}",
        outcome.items_administered
    );
    assert!(outcome.theta.abs() < 0.30, "final theta {} too far from 0", outcome.theta);
    assert_eq!(outcome.stop_reason, StopReason::SeThreshold);
}

#[test]
fn extreme_high_ability_converges_with_bounded_bias() {
    let config = CatConfig::default();
    let bank = generate_bank(50, 7);
    let pool = InMemoryItemPool::new(bank);
    let mut engine = CatEngine::new(config, pool, 7);
    let mut response_rng = StdRng::seed_from_u64(7);

    let outcome = run_to_completion(&mut engine, 2.5, 0.0, &mut response_rng);

    assert!(matches!(
        outcome.stop_reason,
        StopReason::SeThreshold | StopReason::MaxItems | StopReason::ThetaStable
    ));
    let bias = outcome.theta - 2.5;
    assert!(bias >= -0.5 && bias <= 0.5, "bias {bias} out of [-0.5, 0.5]");
    for domain in Domain::ALL {
        assert!(
            outcome.domain_coverage.get(&domain).copied().unwrap_or(0) > 0,
            "{domain} was never covered"
        );
    }
}

#[test]
fn extreme_low_ability_converges_with_bounded_bias() {
    let config = CatConfig::default();
    let bank = generate_bank(50, 13);
    let pool = InMemoryItemPool::new(bank);
    let mut engine = CatEngine::new(config, pool, 13);
    let mut response_rng = StdRng::seed_from_u64(13);

    let outcome = run_to_completion(&mut engine, -2.5, 0.0, &mut response_rng);

    assert!(matches!(
        outcome.stop_reason,
        StopReason::SeThreshold | StopReason::MaxItems | StopReason::ThetaStable
    ));
    let bias = outcome.theta - (-2.5);
    assert!(bias >= -0.5 && bias <= 0.5, "bias {bias} out of [-0.5, 0.5]");
    for domain in Domain::ALL {
        assert!(
            outcome.domain_coverage.get(&domain).copied().unwrap_or(0) > 0,
            "{domain} was never covered"
        );
    }
}

#[test]
fn responses_uncorrelated_with_ability_run_out_the_clock() {
    let config = CatConfig::default();
    let bank = generate_bank(50, 99);
    let pool = InMemoryItemPool::new(bank);
    let mut engine = CatEngine::new(config.clone(), pool, 99);

    let outcome = run_alternating(&mut engine, config.max_items + 1);

    assert_eq!(outcome.items_administered, config.max_items as usize);
    assert_eq!(outcome.stop_reason, StopReason::MaxItems);
    assert!(
        outcome.theta_se >= config.se_threshold,
        "SE {} unexpectedly converged below threshold",
        outcome.theta_se
    );
}

#[test]
fn minimum_items_blocks_the_seventh_item_then_stops_at_the_eighth() {
    let config = CatConfig::default();
    let full_coverage: HashMap<Domain, u32> = Domain::ALL.iter().map(|d| (*d, 1)).collect();

    let seven = evaluate_stopping(
        0.05,
        7,
        &full_coverage,
        &[],
        config.min_items,
        config.max_items,
        config.min_items_per_domain,
        config.content_balance_waiver_threshold,
        config.min_domains_for_waiver,
        config.se_threshold,
        config.se_stabilization_threshold,
        config.delta_theta_threshold,
    )
    .unwrap();
    assert!(!seven.should_stop);

    let eight = evaluate_stopping(
        0.05,
        8,
        &full_coverage,
        &[],
        config.min_items,
        config.max_items,
        config.min_items_per_domain,
        config.content_balance_waiver_threshold,
        config.min_domains_for_waiver,
        config.se_threshold,
        config.se_stabilization_threshold,
        config.delta_theta_threshold,
    )
    .unwrap();
    assert!(eight.should_stop);
    assert_eq!(eight.reason, Some(StopReason::SeThreshold));
}

#[test]
fn content_balance_hard_stop_then_waiver_at_tenth_item() {
    let config = CatConfig::default();
    let mut coverage: HashMap<Domain, u32> = Domain::ALL.iter().map(|d| (*d, 2)).collect();
    coverage.insert(Domain::Memory, 0);

    let nine = evaluate_stopping(
        0.20,
        9,
        &coverage,
        &[],
        config.min_items,
        config.max_items,
        config.min_items_per_domain,
        config.content_balance_waiver_threshold,
        config.min_domains_for_waiver,
        config.se_threshold,
        config.se_stabilization_threshold,
        config.delta_theta_threshold,
    )
    .unwrap();
    assert!(!nine.should_stop);
    assert!(!nine.details.content_balanced);

    let ten = evaluate_stopping(
        0.20,
        10,
        &coverage,
        &[],
        config.min_items,
        config.max_items,
        config.min_items_per_domain,
        config.content_balance_waiver_threshold,
        config.min_domains_for_waiver,
        config.se_threshold,
        config.se_stabilization_threshold,
        config.delta_theta_threshold,
    )
    .unwrap();
    assert!(ten.details.content_balance_waived);
    assert!(ten.should_stop);
}
