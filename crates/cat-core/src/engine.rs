//! `CatEngine`: the narrow operation set exposed to collaborators
//! (`begin_session`, `submit_response`, `get_progress`, `evaluate_readiness`),
//! sequencing the IRT estimator, item selector, and stopping evaluator: a
//! session receives a graded response, asks IRT to update ability, asks the
//! stopping evaluator to decide, and if continuing asks the selector for the
//! next item.
//!
//! This workspace has no external persistence collaborator, so `CatEngine`
//! keeps its own `HashMap<SessionId, SessionState>` as the reference
//! in-memory store a real server's persistence layer would otherwise
//! provide — `SessionState` itself remains an owned, replayable value type,
//! and nothing here prevents a caller from using `SessionEngine::replay`
//! directly against their own store instead of this convenience wrapper.

use crate::domain::Domain;
use crate::item::Item;
use crate::pool::ItemProvider;
use crate::readiness::{evaluate_readiness as evaluate_readiness_impl, ReadinessReport};
use crate::scoring::{score_session, Score};
use crate::selector::{select_next_item, SelectorInput};
use crate::session::{DomainScore, SessionEngine};
use crate::stopping::StopReason;
use cat_common::{Error, ItemId, Result, SessionId, UserId};
use cat_config::CatConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

/// Confidence level used for the scoring adapter's reported interval.
const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Result of `begin_session`.
#[derive(Debug, Clone)]
pub struct BeginSessionResult {
    pub session_id: SessionId,
    /// `None` only if the pool has no eligible items for this user at all.
    pub first_item: Option<Item>,
    pub theta: f64,
    pub theta_se: f64,
}

/// Result of `submit_response`: either the next item to administer, or a
/// finalized session's score.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    NextQuestion {
        item: Item,
        theta: f64,
        theta_se: f64,
        items_administered: usize,
    },
    Completed {
        theta: f64,
        theta_se: f64,
        items_administered: usize,
        domain_scores: HashMap<Domain, DomainScore>,
        stop_reason: StopReason,
        score: Score,
    },
}

/// Result of `get_progress`. Deliberately omits `theta`: progress views do
/// not reveal ability estimates to clients mid-session.
#[derive(Debug, Clone)]
pub struct ProgressView {
    pub items_administered: usize,
    pub items_max: u32,
    pub domain_coverage: HashMap<Domain, u32>,
    pub current_se: f64,
    /// Sum of each administered response's `time_spent`, where reported.
    pub elapsed: f64,
}

/// The engine, parameterized over an item-pool collaborator and holding its
/// own session store plus a seeded RNG for randomesque selection.
pub struct CatEngine<P: ItemProvider> {
    config: CatConfig,
    pool: P,
    sessions: HashMap<SessionId, crate::session::SessionState>,
    rng: StdRng,
}

impl<P: ItemProvider> CatEngine<P> {
    pub fn new(config: CatConfig, pool: P, seed: u64) -> Self {
        CatEngine {
            config,
            pool,
            sessions: HashMap::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &CatConfig {
        &self.config
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Look up a session by id without mutating it.
    pub fn session(&self, session_id: &SessionId) -> Option<&crate::session::SessionState> {
        self.sessions.get(session_id)
    }

    /// `begin_session(user_id, prior_theta?) -> (session_id, first_item, theta, theta_se)`.
    /// Does not itself touch any eligibility history beyond this fresh
    /// session's empty `administered` set; the engine chooses the first
    /// item using the initial theta (prior or 0).
    pub fn begin_session(&mut self, user_id: UserId, prior_theta: Option<f64>) -> BeginSessionResult {
        let prior_theta = prior_theta.unwrap_or(0.0);
        let session_id = SessionId::new();

        let session_engine = SessionEngine::new(&self.config);
        let session = session_engine.initialize(session_id.clone(), user_id.clone(), prior_theta);
        let theta = session.theta;
        let theta_se = session.theta_se;

        let empty_administered = HashSet::new();
        let first_item = self.pick_next(&user_id, theta, &empty_administered, &session.domain_coverage);

        self.sessions.insert(session_id.clone(), session);

        tracing::info!(session_id = %session_id, %user_id, "session started");

        BeginSessionResult {
            session_id,
            first_item,
            theta,
            theta_se,
        }
    }

    /// `submit_response(session_id, item_id, correct, time_spent?) -> result`.
    /// Rejects duplicate submissions for the same item as a conflict;
    /// calibration gaps in the submitted item degrade to a warning rather
    /// than an error.
    pub fn submit_response(
        &mut self,
        session_id: &SessionId,
        item_id: ItemId,
        correct: bool,
        time_spent: Option<f64>,
    ) -> Result<SubmitOutcome> {
        let (step, respondent) = {
            let session = self
                .sessions
                .get_mut(session_id)
                .ok_or_else(|| Error::SessionNotFound {
                    session_id: session_id.to_string(),
                })?;
            if session.stopped {
                return Err(Error::SessionFinalized {
                    session_id: session_id.to_string(),
                });
            }
            if session.administered.iter().any(|r| r.item_id == item_id) {
                return Err(Error::DuplicateResponse {
                    session_id: session_id.to_string(),
                    item_id: item_id.to_string(),
                });
            }

            let item = self.pool.get_by_id(&item_id);
            let (domain, a, b) = match &item {
                Some(item) => (Some(item.domain), Some(item.discrimination), Some(item.difficulty)),
                None => {
                    tracing::warn!(
                        item_id = %item_id,
                        session_id = %session_id,
                        "submitted item not resolvable in pool; recording as a degraded response"
                    );
                    (None, None, None)
                }
            };

            let session_engine = SessionEngine::new(&self.config);
            let respondent = session.user_id.clone();
            let step = session_engine.process_response(session, item_id.clone(), correct, domain, a, b, time_spent)?;
            (step, respondent)
        };
        self.pool.mark_seen(&respondent, &item_id);

        if step.should_stop {
            let reason = step.reason.expect("should_stop implies a stop reason");
            return Ok(self.finalize_outcome(session_id, reason)?);
        }

        let (user_id, theta, administered, domain_coverage) = {
            let session = self.sessions.get(session_id).expect("session exists");
            (
                session.user_id.clone(),
                session.theta,
                session.administered_id_set(),
                session.domain_coverage.clone(),
            )
        };
        let next_item = self.pick_next(&user_id, theta, &administered, &domain_coverage);

        match next_item {
            Some(item) => Ok(SubmitOutcome::NextQuestion {
                item,
                theta: step.theta,
                theta_se: step.theta_se,
                items_administered: step.items_administered,
            }),
            None => {
                tracing::warn!(session_id = %session_id, "item pool exhausted; finalizing session");
                Ok(self.finalize_outcome(session_id, StopReason::ItemPoolExhausted)?)
            }
        }
    }

    /// `get_progress(session_id) -> (items_administered, items_max,
    /// domain_coverage, current_se, elapsed)`. Read-only; does not reveal
    /// `theta`.
    pub fn get_progress(&self, session_id: &SessionId) -> Result<ProgressView> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| Error::SessionNotFound {
                session_id: session_id.to_string(),
            })?;
        let elapsed = session
            .administered
            .iter()
            .filter_map(|r| r.time_spent)
            .sum();
        Ok(ProgressView {
            items_administered: session.administered.len(),
            items_max: self.config.max_items,
            domain_coverage: session.domain_coverage.clone(),
            current_se: session.theta_se,
            elapsed,
        })
    }

    /// `evaluate_readiness() -> ReadinessReport`. Diagnostic; the caller
    /// supplies the full catalogue (readiness is a property of the pool,
    /// not of any one user's eligible subset).
    pub fn evaluate_readiness(&self, catalogue: &[Item]) -> ReadinessReport {
        evaluate_readiness_impl(catalogue, &self.config)
    }

    fn finalize_outcome(&mut self, session_id: &SessionId, reason: StopReason) -> Result<SubmitOutcome> {
        let session = self.sessions.get_mut(session_id).expect("session exists");
        let session_engine = SessionEngine::new(&self.config);
        let final_result = session_engine.finalize(session, reason)?;
        let score = score_session(
            final_result.theta,
            final_result.theta_se,
            DEFAULT_CONFIDENCE,
            self.config.reliability_floor,
        );
        tracing::info!(session_id = %session_id, reason = %reason, items = final_result.items_administered, "session finalized");
        Ok(SubmitOutcome::Completed {
            theta: final_result.theta,
            theta_se: final_result.theta_se,
            items_administered: final_result.items_administered,
            domain_scores: final_result.domain_scores,
            stop_reason: reason,
            score,
        })
    }

    fn pick_next(
        &mut self,
        user_id: &UserId,
        theta: f64,
        administered: &HashSet<ItemId>,
        domain_coverage: &HashMap<Domain, u32>,
    ) -> Option<Item> {
        let eligible = self.pool.list_eligible_for_user(user_id);
        let input = SelectorInput {
            theta,
            administered,
            domain_coverage,
            domain_weights: &self.config.domain_weights,
            min_items_per_domain: self.config.min_items_per_domain,
            randomesque_k: self.config.randomesque_k,
        };
        select_next_item(&eligible, &input, &mut self.rng)
    }
}
