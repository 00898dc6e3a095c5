//! Tenant routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path)
//!     → matcher.rs (exclusion boundary: /api, /_next/static, ...)
//!     → tenant.rs (host → tenant label, rewrite decision)
//!     → Return: Excluded | PassThrough(reason) | Rewrite(/store/{tenant}...)
//!
//! Table Compilation (at startup and on reload):
//!     GatewayConfig
//!     → Compile exclusion matchers and tenant rules
//!     → Freeze as immutable RoutingTable
//! ```
//!
//! # Design Decisions
//! - Tables compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same (host, path) always yields the same decision
//! - First matching rule wins

pub mod matcher;
pub mod router;
pub mod tenant;

pub use matcher::{ExclusionMatcher, Matcher};
pub use router::{RouteOutcome, RoutingTable};
pub use tenant::{PassReason, RoutingDecision, RoutingRequest, TenantRules};
