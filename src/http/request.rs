//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Strip hop-by-hop headers before forwarding
//! - Add X-Forwarded-For, X-Forwarded-Host, X-Forwarded-Proto
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The original Host header is forwarded unchanged so the upstream
//!   still sees the tenant domain
//! - Existing X-Forwarded-For chains are extended, not replaced

use std::net::SocketAddr;

use axum::http::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Request,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Generates a UUID v4 for requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID set by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

const HOP_BY_HOP: [HeaderName; 7] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::UPGRADE,
];

/// Headers to send upstream for a client request.
pub fn upstream_headers(original: &HeaderMap, peer: Option<SocketAddr>) -> HeaderMap {
    let mut headers = original.clone();

    // Headers named in Connection are hop-by-hop too.
    let listed: Vec<HeaderName> = original
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();
    for name in HOP_BY_HOP.iter().chain(listed.iter()) {
        headers.remove(name);
    }
    headers.remove(header::TRANSFER_ENCODING);

    if let Some(peer) = peer {
        let ip = peer.ip().to_string();
        let forwarded_for = match original.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(existing) => format!("{}, {}", existing, ip),
            None => ip,
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }
    }

    if let Some(host) = original.get(header::HOST) {
        headers.insert(X_FORWARDED_HOST, host.clone());
    }
    if !headers.contains_key(&X_FORWARDED_PROTO) {
        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_uuids() {
        let req = Request::builder().body(()).unwrap();
        let id = MakeRequestUuid.make_request_id(&req).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }

    #[test]
    fn strips_hop_by_hop_headers() {
        let mut original = HeaderMap::new();
        original.insert(header::HOST, HeaderValue::from_static("shop1.zikor.shop"));
        original.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-debug"));
        original.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        original.insert("x-debug", HeaderValue::from_static("1"));
        original.insert(header::ACCEPT, HeaderValue::from_static("text/html"));

        let headers = upstream_headers(&original, None);
        assert!(!headers.contains_key(header::CONNECTION));
        assert!(!headers.contains_key("keep-alive"));
        assert!(!headers.contains_key("x-debug"));
        assert_eq!(headers[header::ACCEPT], "text/html");
        assert_eq!(headers[header::HOST], "shop1.zikor.shop");
        assert_eq!(headers[&X_FORWARDED_HOST], "shop1.zikor.shop");
        assert_eq!(headers[&X_FORWARDED_PROTO], "http");
    }

    #[test]
    fn extends_forwarded_for_chain() {
        let peer: SocketAddr = "10.0.0.7:51000".parse().unwrap();

        let headers = upstream_headers(&HeaderMap::new(), Some(peer));
        assert_eq!(headers[&X_FORWARDED_FOR], "10.0.0.7");

        let mut original = HeaderMap::new();
        original.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9"));
        let headers = upstream_headers(&original, Some(peer));
        assert_eq!(headers[&X_FORWARDED_FOR], "203.0.113.9, 10.0.0.7");
    }
}
