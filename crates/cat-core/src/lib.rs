//! Adaptive testing core: item selection, stopping rules, session engine,
//! scoring, and readiness evaluation.
//!
//! This crate holds the four tightly coupled subsystems that a CAT session
//! needs — the IRT-driven session engine, the item selector, the
//! stopping-rule evaluator, and the item-pool view — plus a scoring adapter
//! and a calibration-readiness evaluator. The simulation harness that
//! exercises all of these lives in the sibling `cat-sim` crate.
//!
//! `engine` is the narrow entry point collaborators are expected to use; the
//! other modules are public because `cat-sim` and tests drive them directly
//! without going through a full session.

pub mod domain;
pub mod engine;
pub mod item;
pub mod pool;
pub mod readiness;
pub mod scoring;
pub mod selector;
pub mod session;
pub mod stopping;

pub use domain::{empty_coverage, Domain};
pub use engine::{CatEngine, ProgressView, SubmitOutcome};
pub use item::{AdministeredResponse, Item, QualityFlag};
pub use pool::{InMemoryItemPool, ItemProvider};
pub use readiness::{evaluate_readiness, DomainReadiness, ReadinessReport};
pub use scoring::{score_session, Score};
pub use selector::{select_next_item, SelectorInput};
pub use session::{DomainScore, FinalResult, PersistedResponse, SessionEngine, SessionState, StepResult};
pub use stopping::{evaluate_stopping, StopReason, StoppingDecision, StoppingDetails};
