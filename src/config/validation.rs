//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits ordered)
//! - Check addresses parse before anything binds
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ServiceConfig, PLACEHOLDER_API_KEY};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} ({default}) exceeds pagination.max_limit ({max})")]
    LimitOrder {
        field: &'static str,
        default: usize,
        max: usize,
    },

    #[error("admin.api_key must be set to a non-placeholder value when admin is enabled")]
    InsecureAdminKey,
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.data.visa_dir.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "data.visa_dir" });
    }
    if config.data.university_dir.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "data.university_dir" });
    }

    let pagination = &config.pagination;
    for (field, value) in [
        ("pagination.default_limit", pagination.default_limit),
        ("pagination.top_default_limit", pagination.top_default_limit),
        ("pagination.max_limit", pagination.max_limit),
    ] {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }
    for (field, default) in [
        ("pagination.default_limit", pagination.default_limit),
        ("pagination.top_default_limit", pagination.top_default_limit),
    ] {
        if default > pagination.max_limit {
            errors.push(ValidationError::LimitOrder {
                field,
                default,
                max: pagination.max_limit,
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.admin.enabled {
        let key = config.admin.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            errors.push(ValidationError::InsecureAdminKey);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
