//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the backend pool is usable (non-empty, scheme-less, unique)
//! - Validate value ranges (timeouts and intervals > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::collections::HashSet;
use thiserror::Error;

use crate::config::schema::BalancerConfig;

/// One semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("backend pool is empty")]
    EmptyPool,

    #[error("backend address must not be empty")]
    EmptyAddress,

    #[error("backend address `{0}` must not include a scheme (use host:port)")]
    SchemeInAddress(String),

    #[error("duplicate backend address `{0}`")]
    DuplicateAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backends.is_empty() {
        errors.push(ValidationError::EmptyPool);
    }

    let mut seen = HashSet::new();
    for backend in &config.backends {
        let address = backend.address.trim();
        if address.is_empty() {
            errors.push(ValidationError::EmptyAddress);
            continue;
        }
        if address.contains("://") {
            errors.push(ValidationError::SchemeInAddress(address.to_string()));
        }
        if !seen.insert(address.to_string()) {
            errors.push(ValidationError::DuplicateAddress(address.to_string()));
        }
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.interval_secs"));
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("health_check.timeout_secs"));
    }
    if config.forwarding.timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration("forwarding.timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
