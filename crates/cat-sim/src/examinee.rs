//! Draws simulated responses from the 2PL model and drives one examinee's
//! session through the real `CatEngine`, end to end.

use cat_common::UserId;
use cat_core::{CatEngine, Domain, InMemoryItemPool, ItemProvider, StopReason, SubmitOutcome};
use cat_math::probability_2pl;
use rand::Rng;
use std::collections::HashMap;

/// Outcome of one simulated examinee's test.
#[derive(Debug, Clone)]
pub struct ExamineeResult {
    pub true_theta: f64,
    pub estimated_theta: f64,
    pub final_se: f64,
    pub bias: f64,
    pub items_administered: usize,
    pub stopping_reason: String,
    pub converged: bool,
    pub domain_coverage: HashMap<Domain, u32>,
}

/// Draw a Bernoulli response from the 2PL probability of a correct answer.
pub fn simulate_response<R: Rng>(true_theta: f64, a: f64, b: f64, rng: &mut R) -> bool {
    let prob = probability_2pl(true_theta, a, b);
    rng.random::<f64>() < prob
}

/// Run one examinee through a full session on `engine`, drawing responses
/// against `true_theta`. `prior_theta` seeds the session the same way it
/// would for a real examinee (the simulation uses the configured ability
/// mean as the prior, not the drawn `true_theta`, which the engine never
/// sees). `se_threshold` is only needed to compute `converged`, which the
/// engine's own stop reason does not directly report.
pub fn run_examinee<R: Rng>(
    engine: &mut CatEngine<InMemoryItemPool>,
    true_theta: f64,
    prior_theta: f64,
    se_threshold: f64,
    response_rng: &mut R,
) -> ExamineeResult {
    let begin = engine.begin_session(
        UserId::from(format!("sim-{:016x}", response_rng.random::<u64>())),
        Some(prior_theta),
    );

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
        let correct = simulate_response(true_theta, item.discrimination, item.difficulty, response_rng);
        match engine
            .submit_response(&begin.session_id, item.id, correct, None)
            .expect("simulated sessions never submit duplicate or unknown items")
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

    let (stop_reason, estimated_theta, final_se, items_administered) = outcome.expect("loop always assigns an outcome before breaking");

    let domain_coverage = engine
        .session(&begin.session_id)
        .map(|s| s.domain_coverage.clone())
        .unwrap_or_else(cat_core::empty_coverage);

    ExamineeResult {
        true_theta,
        estimated_theta,
        final_se,
        bias: estimated_theta - true_theta,
        items_administered,
        stopping_reason: stop_reason.to_string(),
        converged: final_se < se_threshold,
        domain_coverage,
    }
}
