//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, prefixes and subdomain labels
//! - Validate value ranges (timeouts > 0, attempts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.address: '{0}' is not a host[:port] authority")]
    InvalidUpstream(String),

    #[error("tenancy.store_prefix: '{0}' must start with '/' and not be '/'")]
    InvalidStorePrefix(String),

    #[error("tenancy.reserved_subdomains: '{0}' is not a single DNS label")]
    InvalidReservedLabel(String),

    #[error("exclusions: '{0}' must start with '/'")]
    InvalidExclusion(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("retries.base_delay_ms must not exceed retries.max_delay_ms")]
    BackoffRange,

    #[error("admin.api_key must not be empty when the admin API is enabled")]
    EmptyApiKey,
}

/// Validate a parsed configuration, collecting every problem.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.upstream.address.parse::<Authority>().is_err() {
        errors.push(ValidationError::InvalidUpstream(config.upstream.address.clone()));
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::EmptyApiKey);
        }
    }

    let prefix = config.tenancy.store_prefix.trim_end_matches('/');
    if !prefix.starts_with('/') {
        errors.push(ValidationError::InvalidStorePrefix(
            config.tenancy.store_prefix.clone(),
        ));
    }

    for label in &config.tenancy.reserved_subdomains {
        if label.is_empty() || label.contains('.') || label.contains(':') {
            errors.push(ValidationError::InvalidReservedLabel(label.clone()));
        }
    }

    for path in config
        .exclusions
        .path_prefixes
        .iter()
        .chain(config.exclusions.exact_paths.iter())
    {
        if !path.starts_with('/') {
            errors.push(ValidationError::InvalidExclusion(path.clone()));
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::Zero("retries.max_attempts"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::BackoffRange);
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
