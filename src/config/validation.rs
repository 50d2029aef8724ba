//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, cache bounds and the version header value
//! - Refuse to start without a shared secret
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("secret must not be empty")]
    EmptySecret,

    #[error("version must be a non-empty, header-safe string")]
    InvalidVersion,

    #[error("invalid {field} '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("edge_cache.{0} must be greater than zero")]
    ZeroCacheBound(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }

    if config.version.trim().is_empty() || HeaderValue::from_str(&config.version).is_err() {
        errors.push(ValidationError::InvalidVersion);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.edge_cache.enabled {
        if config.edge_cache.max_entries == 0 {
            errors.push(ValidationError::ZeroCacheBound("max_entries"));
        }
        if config.edge_cache.max_entry_bytes == 0 {
            errors.push(ValidationError::ZeroCacheBound("max_entry_bytes"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
