//! End-to-end tenant routing through a running gateway.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

mod common;

use common::{start_echo_upstream, start_programmable_upstream, TestGateway};

#[tokio::test]
async fn tenant_root_is_rewritten() {
    let upstream = start_echo_upstream().await;
    let gateway = TestGateway::start(upstream, |_| {}).await;

    let body = gateway.get_text("shop1.zikor.shop", "/").await;
    assert_eq!(
        body,
        "GET /store/shop1 host=shop1.zikor.shop fwd=shop1.zikor.shop body="
    );
}

#[tokio::test]
async fn tenant_subpath_and_query_are_preserved() {
    let upstream = start_echo_upstream().await;
    let gateway = TestGateway::start(upstream, |_| {}).await;

    let body = gateway.get_text("shop1.zikor.shop", "/products?page=2").await;
    assert!(body.starts_with("GET /store/shop1/products?page=2 "), "{}", body);
}

#[tokio::test]
async fn port_in_host_is_ignored() {
    let upstream = start_echo_upstream().await;
    let gateway = TestGateway::start(upstream, |_| {}).await;

    let body = gateway.get_text("shop1.zikor.shop:3000", "/").await;
    assert!(body.starts_with("GET /store/shop1 host=shop1.zikor.shop:3000"), "{}", body);
}

#[tokio::test]
async fn non_tenant_requests_pass_through() {
    let upstream = start_echo_upstream().await;
    let gateway = TestGateway::start(upstream, |_| {}).await;

    let cases = [
        ("zikor.shop", "/pricing", "GET /pricing "),
        ("www.zikor.shop", "/", "GET / "),
        ("prod.zikor.shop", "/dashboard", "GET /dashboard "),
        ("shop1.zikor.shop", "/store/shop1/products", "GET /store/shop1/products "),
        ("shop1.zikor.shop", "/api/orders", "GET /api/orders "),
        ("shop1.zikor.shop", "/_next/static/chunks/app.js", "GET /_next/static/chunks/app.js "),
        ("shop1.zikor.shop", "/favicon.ico", "GET /favicon.ico "),
    ];
    for (host, path, expected) in cases {
        let body = gateway.get_text(host, path).await;
        assert!(body.starts_with(expected), "{} {} -> {}", host, path, body);
    }
}

#[tokio::test]
async fn request_body_is_forwarded() {
    let upstream = start_echo_upstream().await;
    let gateway = TestGateway::start(upstream, |_| {}).await;

    let body = common::client()
        .post(format!("http://{}/cart", gateway.addr))
        .header("Host", "shop1.zikor.shop")
        .body("sku=42")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.starts_with("POST /store/shop1/cart "), "{}", body);
    assert!(body.ends_with("body=sku=42"), "{}", body);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let upstream = start_echo_upstream().await;
    let gateway = TestGateway::start(upstream, |c| c.security.max_body_size = 16).await;

    let res = common::client()
        .post(format!("http://{}/cart", gateway.addr))
        .header("Host", "shop1.zikor.shop")
        .body("x".repeat(64))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn request_id_is_returned() {
    let upstream = start_echo_upstream().await;
    let gateway = TestGateway::start(upstream, |_| {}).await;

    let res = gateway.get("shop1.zikor.shop", "/").await;
    assert!(res.headers().contains_key("x-request-id"));

    let res = common::client()
        .get(format!("http://{}/", gateway.addr))
        .header("Host", "shop1.zikor.shop")
        .header("x-request-id", "req-123")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn retries_idempotent_requests() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let upstream = start_programmable_upstream(move || {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, "Service Unavailable".into())
            } else {
                (200, "Success".into())
            }
        }
    })
    .await;
    let gateway = TestGateway::start(upstream, |_| {}).await;

    let res = gateway.get("shop1.zikor.shop", "/").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Success");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let gateway = TestGateway::start(addr, |c| c.retries.enabled = false).await;

    let res = gateway.get("shop1.zikor.shop", "/").await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn slow_upstream_times_out() {
    let upstream = start_programmable_upstream(|| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        (200, "late".into())
    })
    .await;
    let gateway = TestGateway::start(upstream, |c| {
        c.retries.enabled = false;
        c.timeouts.upstream_secs = 1;
    })
    .await;

    let res = gateway.get("shop1.zikor.shop", "/").await;
    assert_eq!(res.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn reloaded_rules_apply_to_new_requests() {
    let upstream = start_echo_upstream().await;
    let gateway = TestGateway::start(upstream, |_| {}).await;

    let body = gateway.get_text("staging.zikor.shop", "/").await;
    assert!(body.starts_with("GET /store/staging "), "{}", body);

    let mut updated = tenant_gateway::GatewayConfig::default();
    updated.upstream.address = upstream.to_string();
    updated.tenancy.reserved_subdomains.push("staging".into());
    gateway.updates.send(updated).unwrap();

    let mut passed_through = false;
    for _ in 0..50 {
        let body = gateway.get_text("staging.zikor.shop", "/").await;
        if body.starts_with("GET / ") {
            passed_through = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(passed_through, "reload was not applied");
}
