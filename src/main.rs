//! Tenant Gateway
//!
//! Edge gateway in front of the storefront frontend.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request (Host: shop1.zikor.shop, GET /products)
//!         │
//!         ▼
//!     ┌──────────────────────────────────────────────┐
//!     │ request id → trace span → timeout            │
//!     │        │                                     │
//!     │        ▼                                     │
//!     │ exclusions? (/api, /_next/static, ...) ──yes─┼──┐
//!     │        │ no                                  │  │
//!     │        ▼                                     │  │
//!     │ tenant rules: host → "shop1"                 │  │
//!     │   rewrite path → /store/shop1/products       │  │
//!     │        │                                     │  │
//!     │        ▼                                     │  │
//!     │ forward (retry, backoff, X-Forwarded-*) ◀────┼──┘
//!     └────────┼─────────────────────────────────────┘
//!              ▼
//!     Storefront frontend (original Host header preserved)
//! ```

use std::path::PathBuf;

use clap::Parser;

use tenant_gateway::config::{load_config, GatewayConfig};
use tenant_gateway::lifecycle::startup;
use tenant_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "tenant-gateway")]
#[command(about = "Host-based tenant routing gateway for storefronts", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "TENANT_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Reload tenancy rules when the config file changes.
    #[arg(long, requires = "config")]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tenant-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        reserved = ?config.tenancy.reserved_subdomains,
        store_prefix = %config.tenancy.store_prefix,
        "Configuration loaded"
    );

    let watch_path = if args.watch { args.config.clone() } else { None };
    startup::run(config, watch_path).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
