//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the forwarding fallback
//! - Wire up middleware (request ID, tracing, timeout, tenant rewrite)
//! - Serve on a listener with graceful shutdown
//! - Apply reloaded tenancy rules to the live routing table

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    http::{header::HOST, uri::InvalidUri, Request},
    middleware, Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::forward::{forward_handler, AppState};
use crate::http::middleware::{tenant_rewrite, RewriteState};
use crate::http::request::{request_id, MakeRequestUuid};
use crate::lifecycle::shutdown;
use crate::routing::RoutingTable;

/// HTTP server for the tenant gateway.
pub struct GatewayServer {
    router: Router,
    config: GatewayConfig,
    table: Arc<ArcSwap<RoutingTable>>,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, InvalidUri> {
        let table = Arc::new(ArcSwap::from_pointee(RoutingTable::from_config(&config)));
        let state = AppState::from_config(&config)?;
        let router = Self::build_router(&config, state, RewriteState::new(table.clone()));

        Ok(Self {
            router,
            config,
            table,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState, rewrite: RewriteState) -> Router {
        Router::new()
            .fallback(forward_handler)
            .with_state(state)
            .layer(middleware::from_fn_with_state(rewrite, tenant_rewrite))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(req.headers()),
                    method = %req.method(),
                    uri = %req.uri(),
                    host = ?req.headers().get(HOST),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Shared handle to the live routing table.
    pub fn routing_table(&self) -> Arc<ArcSwap<RoutingTable>> {
        self.table.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until `shutdown` fires, applying config updates as
    /// they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "Gateway server starting"
        );

        let table = self.table.clone();
        let current = self.config.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_reload(&table, &current, &new_config);
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await;

        reloader.abort();
        result?;
        tracing::info!("Gateway server stopped");
        Ok(())
    }
}

/// Swap in the routing rules of a reloaded config.
pub fn apply_reload(
    table: &ArcSwap<RoutingTable>,
    current: &GatewayConfig,
    new_config: &GatewayConfig,
) {
    table.store(Arc::new(RoutingTable::from_config(new_config)));
    tracing::info!(
        reserved = ?new_config.tenancy.reserved_subdomains,
        store_prefix = %new_config.tenancy.store_prefix,
        "Routing table reloaded"
    );

    if new_config.listener != current.listener
        || new_config.upstream != current.upstream
        || new_config.timeouts != current.timeouts
    {
        tracing::warn!("Listener, upstream and timeout changes require a restart");
    }
}
