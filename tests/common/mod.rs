//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    http::{HeaderMap, Method, StatusCode, Uri},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use tenant_gateway::config::GatewayConfig;
use tenant_gateway::http::GatewayServer;
use tenant_gateway::lifecycle::Shutdown;

/// Start an upstream that echoes what it received as
/// `METHOD PATH?QUERY host=HOST fwd=X-FORWARDED-HOST body=BODY`.
pub async fn start_echo_upstream() -> SocketAddr {
    let app = Router::new().fallback(
        |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| async move {
            let header = |name: &str| {
                headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-")
                    .to_string()
            };
            format!(
                "{} {} host={} fwd={} body={}",
                method,
                uri,
                header("host"),
                header("x-forwarded-host"),
                String::from_utf8_lossy(&body)
            )
        },
    );
    serve(app).await
}

/// Start an upstream whose status and body come from `f`.
#[allow(dead_code)]
pub async fn start_programmable_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let f = Arc::new(f);
    let app = Router::new().fallback(move || {
        let f = f.clone();
        async move {
            let (status, body) = f().await;
            (StatusCode::from_u16(status).unwrap(), body)
        }
    });
    serve(app).await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A gateway running on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub updates: mpsc::UnboundedSender<GatewayConfig>,
}

impl TestGateway {
    pub async fn start(upstream: SocketAddr, configure: impl FnOnce(&mut GatewayConfig)) -> Self {
        let mut config = GatewayConfig::default();
        config.upstream.address = upstream.to_string();
        config.observability.metrics_enabled = false;
        config.retries.base_delay_ms = 10;
        config.retries.max_delay_ms = 50;
        configure(&mut config);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        config.listener.bind_address = addr.to_string();

        let shutdown = Shutdown::new();
        let (updates, config_updates) = mpsc::unbounded_channel();
        let server = GatewayServer::new(config).unwrap();
        let server_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            let _ = server.run(listener, config_updates, server_shutdown).await;
        });

        Self {
            addr,
            shutdown,
            updates,
        }
    }

    /// GET `path` with the given Host header.
    pub async fn get(&self, host: &str, path: &str) -> reqwest::Response {
        client()
            .get(format!("http://{}{}", self.addr, path))
            .header("Host", host)
            .send()
            .await
            .expect("gateway unreachable")
    }

    pub async fn get_text(&self, host: &str, path: &str) -> String {
        self.get(host, path).await.text().await.unwrap()
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
