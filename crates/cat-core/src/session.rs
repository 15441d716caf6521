//! The session state machine: the only component that mutates a
//! `SessionState`. Owns `initialize`/`process_response`/`finalize`/`replay`.

use crate::domain::{empty_coverage, Domain};
use crate::item::AdministeredResponse;
use crate::pool::ItemProvider;
use crate::stopping::{evaluate_stopping, StopReason};
use cat_common::{Error, ItemId, Result, SessionId, UserId};
use cat_config::CatConfig;
use cat_math::{eap_estimate, ResponseRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-session in-memory state. Owned value type: no interior mutability,
/// no reference to the pool or to persistence. Persistence is the
/// collaborator's concern, consumed via the response log on replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub prior_theta: f64,
    pub theta: f64,
    pub theta_se: f64,
    pub administered: Vec<AdministeredResponse>,
    pub domain_coverage: HashMap<Domain, u32>,
    pub theta_history: Vec<f64>,
    /// Count of administered responses whose item could not be resolved
    /// against the pool (live submission or replay alike). Tracked
    /// separately from `domain_coverage` rather than attributed to an
    /// arbitrary `Domain`, so an unresolvable item never perturbs the
    /// content-balance stopping rule.
    pub degraded_items: u32,
    pub stopped: bool,
    pub stop_reason: Option<StopReason>,
}

impl SessionState {
    fn administered_ids(&self) -> HashSet<ItemId> {
        self.administered.iter().map(|r| r.item_id.clone()).collect()
    }

    /// Public form of `administered_ids`, for callers outside this module
    /// (the top-level engine's selector call) that need the same set
    /// without duplicating the `.iter().map(...).collect()` pattern.
    pub fn administered_id_set(&self) -> HashSet<ItemId> {
        self.administered_ids()
    }
}

/// Outcome of `process_response`.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub theta: f64,
    pub theta_se: f64,
    pub items_administered: usize,
    pub should_stop: bool,
    pub reason: Option<StopReason>,
}

/// Outcome of `finalize`.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalResult {
    pub theta: f64,
    pub theta_se: f64,
    pub items_administered: usize,
    pub correct_count: usize,
    pub domain_scores: HashMap<Domain, DomainScore>,
    pub stop_reason: StopReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    pub correct: u32,
    pub total: u32,
    pub pct: f64,
}

/// A single entry of a persisted response log, as read back by `replay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedResponse {
    pub item_id: ItemId,
    pub correct: bool,
    pub time_spent: Option<f64>,
}

/// Stateless unit struct parameterized only by `&CatConfig`; holds no
/// session data of its own.
pub struct SessionEngine<'a> {
    config: &'a CatConfig,
}

impl<'a> SessionEngine<'a> {
    pub fn new(config: &'a CatConfig) -> Self {
        SessionEngine { config }
    }

    /// Sets `theta = prior_theta`, `theta_se = 1.0`, empties the
    /// collections. Does not hit the pool or select any item.
    pub fn initialize(&self, session_id: SessionId, user_id: UserId, prior_theta: f64) -> SessionState {
        SessionState {
            session_id,
            user_id,
            prior_theta,
            theta: prior_theta,
            theta_se: 1.0,
            administered: Vec::new(),
            domain_coverage: empty_coverage(),
            theta_history: Vec::new(),
            degraded_items: 0,
            stopped: false,
            stop_reason: None,
        }
    }

    /// Validates the item is not already in `administered`; appends the
    /// response; recomputes `(theta, theta_se)` over the entire history;
    /// evaluates the stopping rules.
    ///
    /// When `a`/`b` are missing, logs a warning and substitutes
    /// `a = 1.0, b = 0.0` but still records the response — a calibration
    /// gap is a recoverable degradation, never a reason to drop a received
    /// response.
    ///
    /// `domain` is `None` when the caller could not resolve the item against
    /// the pool at all (a deleted item replayed from a log, or an unknown
    /// item submitted live). Such a response still counts toward
    /// `items_administered` and `theta_history`, but is excluded from
    /// `domain_coverage` and tallied in `degraded_items` instead — never
    /// attributed to an arbitrary `Domain`.
    pub fn process_response(
        &self,
        session: &mut SessionState,
        item_id: ItemId,
        correct: bool,
        domain: Option<Domain>,
        a: Option<f64>,
        b: Option<f64>,
        time_spent: Option<f64>,
    ) -> Result<StepResult> {
        if session.stopped {
            return Err(Error::SessionFinalized {
                session_id: session.session_id.to_string(),
            });
        }
        if session.administered_ids().contains(&item_id) {
            return Err(Error::DuplicateResponse {
                session_id: session.session_id.to_string(),
                item_id: item_id.to_string(),
            });
        }

        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                tracing::warn!(
                    item_id = %item_id,
                    session_id = %session.session_id,
                    "item administered without calibration parameters; using neutral defaults a=1.0, b=0.0"
                );
                (1.0, 0.0)
            }
        };

        let sequence = session.administered.len() as u32;
        session.administered.push(AdministeredResponse {
            sequence,
            item_id,
            domain,
            correct,
            discrimination: a,
            difficulty: b,
            time_spent,
        });
        match domain {
            Some(domain) => {
                *session.domain_coverage.entry(domain).or_insert(0) += 1;
            }
            None => session.degraded_items += 1,
        }

        let responses: Vec<ResponseRecord> = session
            .administered
            .iter()
            .map(|r| ResponseRecord {
                a: r.discrimination,
                b: r.difficulty,
                correct: r.correct,
            })
            .collect();
        let (theta, theta_se) = eap_estimate(&responses, session.prior_theta);
        session.theta = theta;
        session.theta_se = theta_se;
        session.theta_history.push(theta);

        let decision = evaluate_stopping(
            theta_se,
            session.administered.len() as u32,
            &session.domain_coverage,
            &session.theta_history,
            self.config.min_items,
            self.config.max_items,
            self.config.min_items_per_domain,
            self.config.content_balance_waiver_threshold,
            self.config.min_domains_for_waiver,
            self.config.se_threshold,
            self.config.se_stabilization_threshold,
            self.config.delta_theta_threshold,
        )
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;

        Ok(StepResult {
            theta,
            theta_se,
            items_administered: session.administered.len(),
            should_stop: decision.should_stop,
            reason: decision.reason,
        })
    }

    /// Freezes the session. Idempotent: a second call is an error.
    pub fn finalize(&self, session: &mut SessionState, stop_reason: StopReason) -> Result<FinalResult> {
        if session.stopped {
            return Err(Error::SessionFinalized {
                session_id: session.session_id.to_string(),
            });
        }
        session.stopped = true;
        session.stop_reason = Some(stop_reason);

        let mut domain_scores: HashMap<Domain, DomainScore> = Domain::ALL
            .into_iter()
            .map(|d| {
                (
                    d,
                    DomainScore {
                        correct: 0,
                        total: 0,
                        pct: 0.0,
                    },
                )
            })
            .collect();
        let mut correct_count = 0usize;
        for response in &session.administered {
            if response.correct {
                correct_count += 1;
            }
            if let Some(score) = response.domain.and_then(|d| domain_scores.get_mut(&d)) {
                score.total += 1;
                if response.correct {
                    score.correct += 1;
                }
            }
        }
        for score in domain_scores.values_mut() {
            if score.total > 0 {
                score.pct = f64::from(score.correct) / f64::from(score.total);
            }
        }

        Ok(FinalResult {
            theta: session.theta,
            theta_se: session.theta_se,
            items_administered: session.administered.len(),
            correct_count,
            domain_scores,
            stop_reason,
        })
    }

    /// Rebuilds a session from a persisted log by calling `initialize` then
    /// folding `process_response` over the log in order. An entry whose
    /// item cannot be resolved via `pool.get_by_id` (a deleted item) is
    /// logged at `warn` and skipped into the neutral calibration defaults
    /// with `domain = None` — it is never fabricated or reordered, and it
    /// is counted in `degraded_items` rather than attributed to an
    /// arbitrary `Domain`, so `domain_coverage` after replay is
    /// byte-identical to the live session it reconstructs. The response
    /// still advances the administered/theta_history sequence, so
    /// `len(administered) == len(theta_history) == len(log)` continues to
    /// hold after replay.
    pub fn replay(
        &self,
        session_id: SessionId,
        user_id: UserId,
        prior_theta: f64,
        log: &[PersistedResponse],
        pool: &dyn ItemProvider,
    ) -> Result<SessionState> {
        let mut session = self.initialize(session_id, user_id, prior_theta);
        for entry in log {
            let item = pool.get_by_id(&entry.item_id);
            let (domain, a, b) = match &item {
                Some(item) => (Some(item.domain), Some(item.discrimination), Some(item.difficulty)),
                None => {
                    tracing::warn!(
                        item_id = %entry.item_id,
                        session_id = %session.session_id,
                        "item unavailable during replay; skipping domain attribution"
                    );
                    (None, None, None)
                }
            };
            self.process_response(
                &mut session,
                entry.item_id.clone(),
                entry.correct,
                domain,
                a,
                b,
                entry.time_spent,
            )?;
        }
        Ok(session)
    }
}
