//! Tenant rewrite middleware.
//!
//! Rewrites requests addressed to a tenant subdomain onto the canonical
//! `/store/{tenant}` route (internal rewrite, no redirect). Excluded paths
//! and every pass-through decision continue unchanged.

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;
use crate::routing::tenant::rewrite_uri;
use crate::routing::{RouteOutcome, RoutingDecision, RoutingTable};

/// Attached to rewritten requests for downstream handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRewrite {
    pub tenant: String,
    pub original_path: String,
}

/// State for the tenant rewrite middleware.
#[derive(Clone)]
pub struct RewriteState {
    pub table: Arc<ArcSwap<RoutingTable>>,
}

impl RewriteState {
    pub fn new(table: Arc<ArcSwap<RoutingTable>>) -> Self {
        Self { table }
    }
}

pub async fn tenant_rewrite(
    State(state): State<RewriteState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let outcome = state.table.load().route(&request);
    metrics::record_decision(outcome.outcome());

    match outcome {
        RouteOutcome::Decided(RoutingDecision::Rewrite { tenant, path }) => {
            match rewrite_uri(request.uri(), &path) {
                Ok(new_uri) => {
                    tracing::debug!(
                        tenant = %tenant,
                        from = %request.uri().path(),
                        to = %path,
                        "Tenant rewrite"
                    );
                    let original_path = request.uri().path().to_string();
                    *request.uri_mut() = new_uri;
                    request.extensions_mut().insert(TenantRewrite {
                        tenant,
                        original_path,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        tenant = %tenant,
                        error = %e,
                        "Rewritten URI is invalid, passing through"
                    );
                }
            }
        }
        other => {
            tracing::debug!(
                path = %request.uri().path(),
                outcome = other.outcome(),
                "No tenant rewrite"
            );
        }
    }

    next.run(request).await
}
