//! Error taxonomy for the CAT engine.
//!
//! Every fallible operation in `cat-core`/`cat-math` returns a `thiserror`
//! enum scoped to its own module; this module provides the cross-cutting
//! `ErrorCategory`/`code`/`is_recoverable` classification used when those
//! errors cross the engine boundary to a collaborator: input validation
//! fails fast, session conflicts surface as conflicts, pool exhaustion is a
//! terminal stop reason, calibration gaps are warnings only and never reach
//! this type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for CAT engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Bad argument: negative SE, non-positive discrimination, unknown domain.
    Validation,
    /// Session invariant violation: duplicate response, finalized session, unknown session.
    Conflict,
    /// Item-pool exhaustion or pool-read failure.
    Pool,
    /// Configuration load/validation errors.
    Config,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Conflict => write!(f, "conflict"),
            ErrorCategory::Pool => write!(f, "pool"),
            ErrorCategory::Config => write!(f, "config"),
        }
    }
}

/// Unified error type for CAT engine collaborators.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown domain: {0}")]
    UnknownDomain(String),

    #[error("duplicate response for item {item_id} in session {session_id}")]
    DuplicateResponse { session_id: String, item_id: String },

    #[error("session {session_id} is already finalized")]
    SessionFinalized { session_id: String },

    #[error("unknown session: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("item pool exhausted after {items_administered} items")]
    PoolExhausted { items_administered: usize },

    #[error("item pool read failed: {0}")]
    PoolRead(String),

    #[error("configuration invalid: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Stable error code for machine consumption, grouped by category.
    pub fn code(&self) -> u32 {
        match self {
            Error::InvalidArgument(_) => 10,
            Error::UnknownDomain(_) => 11,
            Error::DuplicateResponse { .. } => 20,
            Error::SessionFinalized { .. } => 21,
            Error::SessionNotFound { .. } => 22,
            Error::PoolExhausted { .. } => 30,
            Error::PoolRead(_) => 31,
            Error::InvalidConfig(_) => 40,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidArgument(_) | Error::UnknownDomain(_) => ErrorCategory::Validation,
            Error::DuplicateResponse { .. }
            | Error::SessionFinalized { .. }
            | Error::SessionNotFound { .. } => ErrorCategory::Conflict,
            Error::PoolExhausted { .. } | Error::PoolRead(_) => ErrorCategory::Pool,
            Error::InvalidConfig(_) => ErrorCategory::Config,
        }
    }

    /// Whether a caller can reasonably retry or work around this error.
    ///
    /// Pool exhaustion is not a failure the caller retries — the session
    /// engine treats it as a terminal stop reason and finalizes gracefully —
    /// so it is reported as recoverable here in the sense that no invariant
    /// was violated.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::SessionFinalized { .. } | Error::DuplicateResponse { .. }
        )
    }
}

/// Structured error payload for JSON-consuming collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    pub code: u32,
    pub category: ErrorCategory,
    pub message: String,
    pub recoverable: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();
        match err {
            Error::DuplicateResponse { session_id, item_id } => {
                context.insert("session_id".to_string(), serde_json::json!(session_id));
                context.insert("item_id".to_string(), serde_json::json!(item_id));
            }
            Error::SessionFinalized { session_id } | Error::SessionNotFound { session_id } => {
                context.insert("session_id".to_string(), serde_json::json!(session_id));
            }
            Error::PoolExhausted { items_administered } => {
                context.insert(
                    "items_administered".to_string(),
                    serde_json::json!(items_administered),
                );
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}
