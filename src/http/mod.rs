//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span, timeout)
//!     → middleware/tenant_rewrite.rs (exclusions, tenant decision, URI rewrite)
//!     → forward.rs (buffer body, retry, send upstream)
//!     → request.rs (hop-by-hop stripping, X-Forwarded-*)
//!     → Upstream response streamed back to client
//! ```

pub mod forward;
pub mod middleware;
pub mod request;
pub mod server;

pub use forward::AppState;
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::GatewayServer;
