//! Request middleware applied in front of the forwarding handler.

pub mod tenant_rewrite;

pub use tenant_rewrite::{tenant_rewrite, RewriteState, TenantRewrite};
