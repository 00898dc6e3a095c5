//! Tenant subdomain resolution and path rewriting.
//!
//! # Responsibilities
//! - Extract the tenant label from the Host header
//! - Skip reserved operational subdomains and already-rewritten paths
//! - Produce the canonical `/store/{tenant}` path for the upstream
//!
//! # Design Decisions
//! - Pure function of (host, path): no I/O, no shared mutable state
//! - Every input maps to a decision; ambiguity resolves to pass-through
//! - Reserved labels are compared case-sensitively (`WWW` is a tenant)
//! - Rewrites are internal: the client-visible URL never changes

use std::collections::HashSet;

use axum::http::{header::HOST, uri::PathAndQuery, Request, Uri};

use crate::config::TenancyConfig;

/// Subdomains that always resolve to the default application.
pub const DEFAULT_RESERVED_SUBDOMAINS: &[&str] = &["www", "api", "prod"];

/// Path prefix under which tenant storefront pages live.
pub const DEFAULT_STORE_PREFIX: &str = "/store";

/// The two inputs the tenant decision needs from a request.
pub trait RoutingRequest {
    /// Raw value of the `Host` header, if present and valid UTF-8.
    fn host(&self) -> Option<&str>;

    /// Request path, always starting with `/`.
    fn path(&self) -> &str;
}

impl<B> RoutingRequest for Request<B> {
    fn host(&self) -> Option<&str> {
        self.headers().get(HOST).and_then(|h| h.to_str().ok())
    }

    fn path(&self) -> &str {
        self.uri().path()
    }
}

/// Why a request was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassReason {
    /// No Host header; the tenant cannot be identified.
    MissingHost,
    /// Apex or bare host with no subdomain label.
    NoSubdomain,
    /// First label is an operational subdomain.
    ReservedSubdomain,
    /// Path already points into the store prefix.
    AlreadyRewritten,
}

impl PassReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassReason::MissingHost => "missing_host",
            PassReason::NoSubdomain => "no_subdomain",
            PassReason::ReservedSubdomain => "reserved_subdomain",
            PassReason::AlreadyRewritten => "already_rewritten",
        }
    }
}

/// Outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Continue with the original path.
    PassThrough(PassReason),
    /// Continue as though the request path were `path`.
    Rewrite { tenant: String, path: String },
}

impl RoutingDecision {
    /// Metric/log label for this decision.
    pub fn outcome(&self) -> &'static str {
        match self {
            RoutingDecision::PassThrough(reason) => reason.as_str(),
            RoutingDecision::Rewrite { .. } => "rewrite",
        }
    }
}

/// Compiled tenant routing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantRules {
    reserved: HashSet<String>,
    store_prefix: String,
}

impl TenantRules {
    /// Create rules from a reserved label set and a store prefix.
    ///
    /// A trailing `/` on the prefix is dropped so `/store/` and `/store`
    /// behave the same.
    pub fn new<I, S>(reserved: I, store_prefix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut store_prefix = store_prefix.into();
        while store_prefix.len() > 1 && store_prefix.ends_with('/') {
            store_prefix.pop();
        }
        Self {
            reserved: reserved.into_iter().map(Into::into).collect(),
            store_prefix,
        }
    }

    pub fn from_config(config: &TenancyConfig) -> Self {
        Self::new(config.reserved_subdomains.iter().cloned(), config.store_prefix.clone())
    }

    pub fn is_reserved(&self, label: &str) -> bool {
        self.reserved.contains(label)
    }

    /// Reserved labels, sorted for stable output.
    pub fn reserved(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.reserved.iter().cloned().collect();
        labels.sort();
        labels
    }

    pub fn store_prefix(&self) -> &str {
        &self.store_prefix
    }

    /// Evaluate a request.
    pub fn decide<R: RoutingRequest + ?Sized>(&self, request: &R) -> RoutingDecision {
        self.decide_parts(request.host(), request.path())
    }

    /// Evaluate a raw (host, path) pair. First matching rule wins.
    pub fn decide_parts(&self, host: Option<&str>, path: &str) -> RoutingDecision {
        let Some(host) = host else {
            return RoutingDecision::PassThrough(PassReason::MissingHost);
        };

        let Some(tenant) = candidate_subdomain(host) else {
            return RoutingDecision::PassThrough(PassReason::NoSubdomain);
        };

        if self.is_reserved(tenant) {
            return RoutingDecision::PassThrough(PassReason::ReservedSubdomain);
        }

        if self.is_rewritten(path) {
            return RoutingDecision::PassThrough(PassReason::AlreadyRewritten);
        }

        RoutingDecision::Rewrite {
            tenant: tenant.to_string(),
            path: self.rewrite_path(tenant, path),
        }
    }

    /// `{prefix}/{tenant}` followed by the original path, except for `/`.
    pub fn rewrite_path(&self, tenant: &str, path: &str) -> String {
        if path == "/" {
            format!("{}/{}", self.store_prefix, tenant)
        } else {
            format!("{}/{}{}", self.store_prefix, tenant, path)
        }
    }

    fn is_rewritten(&self, path: &str) -> bool {
        path.strip_prefix(self.store_prefix.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl Default for TenantRules {
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED_SUBDOMAINS.iter().copied(), DEFAULT_STORE_PREFIX)
    }
}

/// Host without an explicit `:port` suffix.
pub fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

/// First label of hosts with more than two labels.
///
/// The label may be empty (`.example.com`); only the label count decides.
pub fn candidate_subdomain(host: &str) -> Option<&str> {
    let clean = strip_port(host);
    let mut labels = clean.split('.');
    let first = labels.next()?;
    if labels.count() < 2 {
        return None;
    }
    Some(first)
}

/// Clone `original` with only the path replaced.
pub fn rewrite_uri(original: &Uri, new_path: &str) -> Result<Uri, axum::http::Error> {
    let path_and_query = match original.query() {
        Some(query) => format!("{}?{}", new_path, query),
        None => new_path.to_string(),
    };
    let mut parts = original.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}
