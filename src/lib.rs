//! Multi-tenant storefront edge gateway.
//!
//! Requests addressed to `{tenant}.example.com` are rewritten onto the
//! storefront route `/store/{tenant}/...` and forwarded to the frontend,
//! while the client-visible URL stays unchanged.

pub mod admin;
pub mod config;
pub mod errors;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod routing;

pub use config::GatewayConfig;
pub use errors::GatewayError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
pub use routing::{RoutingDecision, RoutingTable, TenantRules};
