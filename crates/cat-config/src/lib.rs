//! Resolved, validated configuration for the CAT engine.
//!
//! This crate provides:
//! - `CatConfig`, the explicit parameter bundle covering every engine tunable
//! - Resolution (CLI -> env -> XDG -> built-in defaults)
//! - Semantic validation

pub mod config;
pub mod resolve;
pub mod validate;

pub use config::{CatConfig, DomainWeights, DOMAIN_ORDER};
pub use resolve::{resolve, resolve_config_path, ConfigSource, ResolvedConfigPath};
pub use validate::{validate_config, ValidationError, ValidationResult};
