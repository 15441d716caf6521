//! Shared identifiers, error taxonomy, and output formats for the CAT engine.
//!
//! This crate provides the foundational types used by `cat-math`, `cat-config`,
//! `cat-core`, and `cat-sim`:
//! - Identity newtypes (`ItemId`, `UserId`, `SessionId`)
//! - The engine-wide error taxonomy
//! - CLI output format specification

pub mod error;
pub mod id;
pub mod output;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use id::{ItemId, SessionId, UserId};
pub use output::OutputFormat;
