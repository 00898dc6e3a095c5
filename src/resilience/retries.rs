//! Retry policy for upstream forwarding.
//!
//! # Design Decisions
//! - Never retry POST/PATCH (non-idempotent)
//! - Connection errors and timeouts are retryable
//! - Only 502/503/504 from the upstream are retried

use axum::http::{Method, StatusCode};

use crate::config::RetryConfig;

/// Whether a failed attempt may be repeated.
pub fn is_retryable(method: &Method, status: Option<StatusCode>, network_error: bool) -> bool {
    if !method.is_idempotent() {
        return false;
    }
    if network_error {
        return true;
    }
    matches!(
        status,
        Some(StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT)
    )
}

/// Attempt budget for a request with the given method.
pub fn max_attempts(config: &RetryConfig, method: &Method) -> u32 {
    if config.enabled && method.is_idempotent() {
        config.max_attempts.max(1)
    } else {
        1
    }
}
