//! Upstream forwarding.
//!
//! # Responsibilities
//! - Buffer the request body within the configured limit
//! - Send the (possibly rewritten) request to the storefront frontend
//! - Retry idempotent requests on gateway errors
//! - Map upstream failures to 502/504

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, State},
    http::{header, request::Parts, uri::Authority, Request, Uri},
    response::{IntoResponse, Response},
};
use hyper_util::client::legacy::{connect::HttpConnector, Client};

use crate::config::{GatewayConfig, RetryConfig};
use crate::errors::GatewayError;
use crate::http::middleware::TenantRewrite;
use crate::http::request::{request_id, upstream_headers};
use crate::observability::metrics;
use crate::resilience::{backoff::backoff_for, retries};

/// Application state injected into the forwarding handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
    pub upstream_timeout: Duration,
    pub retry_config: RetryConfig,
    pub max_body_size: usize,
}

impl AppState {
    /// Build the state and its pooled HTTP client from configuration.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, axum::http::uri::InvalidUri> {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            upstream: config.upstream.address.parse()?,
            upstream_timeout: Duration::from_secs(config.timeouts.upstream_secs),
            retry_config: config.retries.clone(),
            max_body_size: config.security.max_body_size,
        })
    }
}

/// Fallback handler: forwards every request to the upstream.
pub async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    if let Some(rewrite) = request.extensions().get::<TenantRewrite>() {
        tracing::debug!(
            request_id = %request_id(request.headers()),
            tenant = %rewrite.tenant,
            original_path = %rewrite.original_path,
            "Forwarding tenant request"
        );
    }

    let response = match forward(&state, request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Forwarding failed");
            e.into_response()
        }
    };

    metrics::record_request(&method, response.status().as_u16(), start);
    response
}

async fn forward(state: &AppState, request: Request<Body>) -> Result<Response, GatewayError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let (parts, body) = request.into_parts();
    let body = read_body(&parts, body, state.max_body_size).await?;

    let uri = upstream_uri(&state.upstream, &parts.uri)?;
    let headers = upstream_headers(&parts.headers, peer);
    let max_attempts = retries::max_attempts(&state.retry_config, &parts.method);

    let mut attempt = 0;
    loop {
        attempt += 1;

        let mut upstream_request = Request::builder()
            .method(parts.method.clone())
            .uri(uri.clone())
            .body(Body::from(body.clone()))?;
        *upstream_request.headers_mut() = headers.clone();

        let result = tokio::time::timeout(
            state.upstream_timeout,
            state.client.request(upstream_request),
        )
        .await;

        let can_retry = |status, network_error| {
            attempt < max_attempts && retries::is_retryable(&parts.method, status, network_error)
        };

        let error = match result {
            Ok(Ok(response)) => {
                let status = response.status();
                if !can_retry(Some(status), false) {
                    let (parts, body) = response.into_parts();
                    return Ok(Response::from_parts(parts, Body::new(body)));
                }
                tracing::info!(attempt, status = %status, "Retrying upstream request");
                None
            }
            Ok(Err(e)) => {
                if !can_retry(None, true) {
                    return Err(GatewayError::Upstream(e));
                }
                Some(e.to_string())
            }
            Err(_) => {
                if !can_retry(None, true) {
                    return Err(GatewayError::Timeout(state.upstream_timeout));
                }
                Some("timeout".to_string())
            }
        };

        let delay = backoff_for(&state.retry_config, attempt);
        if let Some(error) = error {
            tracing::info!(attempt, delay = ?delay, error = %error, "Retrying after upstream error");
        }
        metrics::record_retry();
        tokio::time::sleep(delay).await;
    }
}

async fn read_body(parts: &Parts, body: Body, limit: usize) -> Result<Bytes, GatewayError> {
    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(GatewayError::PayloadTooLarge { limit });
    }

    axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| GatewayError::Body(e.to_string()))
}

/// Absolute upstream URI carrying the request's path and query.
pub fn upstream_uri(upstream: &Authority, original: &Uri) -> Result<Uri, axum::http::Error> {
    let path_and_query = original
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/");
    Ok(Uri::builder()
        .scheme("http")
        .authority(upstream.clone())
        .path_and_query(path_and_query)
        .build()?)
}
