//! Operational admin API.
//!
//! Served on its own listener so tenant hosts can never reach it.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{middleware, routing::get, Router};

use crate::routing::RoutingTable;
use self::auth::admin_auth_middleware;
use self::handlers::*;

#[derive(Clone)]
pub struct AdminState {
    pub table: Arc<ArcSwap<RoutingTable>>,
    pub api_key: Arc<str>,
}

impl AdminState {
    pub fn new(table: Arc<ArcSwap<RoutingTable>>, api_key: impl Into<Arc<str>>) -> Self {
        Self {
            table,
            api_key: api_key.into(),
        }
    }
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/tenancy", get(get_tenancy))
        .route("/admin/resolve", get(resolve))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn router() -> Router {
        setup_admin_router(AdminState::new(
            Arc::new(ArcSwap::from_pointee(RoutingTable::default())),
            "secret",
        ))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(uri: &str) -> T {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .header("Authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn rejects_missing_or_wrong_key() {
        let response = router()
            .oneshot(Request::builder().uri("/admin/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/admin/status")
                    .header("Authorization", "Bearer wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_exact_bearer_key() {
        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/admin/status")
                    .header("Authorization", "Bearer secret")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router()
            .oneshot(
                Request::builder()
                    .uri("/admin/status")
                    .header("Authorization", "Bearer secret2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn reports_tenancy() {
        let summary: TenancySummary = get_json("/admin/tenancy").await;
        assert_eq!(summary.reserved_subdomains, vec!["api", "prod", "www"]);
        assert_eq!(summary.store_prefix, "/store");
        assert_eq!(summary.excluded_paths, vec!["/favicon.ico"]);
    }

    #[tokio::test]
    async fn resolves_dry_run() {
        let result: ResolveResult =
            get_json("/admin/resolve?host=shop1.zikor.shop&path=/products").await;
        assert_eq!(
            result,
            ResolveResult {
                outcome: "rewrite".into(),
                tenant: Some("shop1".into()),
                path: "/store/shop1/products".into(),
            }
        );

        let result: ResolveResult = get_json("/admin/resolve?path=/products").await;
        assert_eq!(result.outcome, "missing_host");
        assert_eq!(result.path, "/products");
    }
}
