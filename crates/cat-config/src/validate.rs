//! Configuration validation errors and semantic validation.

use thiserror::Error;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Semantic validation failed: {0}")]
    SemanticError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::IoError(_) => 60,
            ValidationError::ParseError(_) => 61,
            ValidationError::SemanticError(_) => 63,
            ValidationError::InvalidValue { .. } => 65,
        }
    }
}

/// Validate a `CatConfig` semantically: domain weights sum to 1 (within
/// tolerance), every threshold is non-negative, and `min_items < max_items`.
pub fn validate_config(config: &crate::config::CatConfig) -> ValidationResult<()> {
    use crate::config::DOMAIN_ORDER;

    for domain in DOMAIN_ORDER {
        if !config.domain_weights.contains_key(domain) {
            return Err(ValidationError::InvalidValue {
                field: "domain_weights".to_string(),
                message: format!("missing weight for domain '{domain}'"),
            });
        }
    }

    let sum: f64 = DOMAIN_ORDER
        .iter()
        .map(|d| config.domain_weights[*d])
        .sum();
    if (sum - 1.0).abs() > 1e-6 {
        return Err(ValidationError::SemanticError(format!(
            "domain_weights must sum to 1.0, got {sum}"
        )));
    }

    for (field, value) in [
        ("se_threshold", config.se_threshold),
        ("se_stabilization_threshold", config.se_stabilization_threshold),
        ("delta_theta_threshold", config.delta_theta_threshold),
        ("max_se_difficulty", config.max_se_difficulty),
        ("max_se_discrimination", config.max_se_discrimination),
        ("reliability_floor", config.reliability_floor),
    ] {
        if value < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: field.to_string(),
                message: format!("must be non-negative, got {value}"),
            });
        }
    }

    if config.min_items >= config.max_items {
        return Err(ValidationError::SemanticError(format!(
            "min_items ({}) must be less than max_items ({})",
            config.min_items, config.max_items
        )));
    }

    if config.randomesque_k == 0 {
        return Err(ValidationError::InvalidValue {
            field: "randomesque_k".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    Ok(())
}
