//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → per-attempt timeout (enforced by the forwarder)
//!     → On failure: retries.rs (check if retryable)
//!     → backoff.rs (exponential delay with jitter)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every upstream call has a deadline
//! - Retries only for idempotent requests (GET, HEAD, etc.)
//! - Jittered backoff prevents thundering herd

pub mod backoff;
pub mod retries;
