use std::path::PathBuf;

use axum::http::{uri::InvalidUri, Uri};
use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use thiserror::Error;

use tenant_gateway::admin::handlers::ResolveResult;
use tenant_gateway::config::load_config;
use tenant_gateway::routing::RoutingTable;

#[derive(Parser)]
#[command(name = "tenant-cli")]
#[command(about = "Management CLI for the tenant gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    #[arg(short, long, env = "TENANT_GATEWAY_ADMIN_KEY", default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how a URL would be routed, without contacting the gateway
    Resolve {
        /// Full request URL, e.g. https://shop1.zikor.shop/products
        target: String,

        /// Use the tenancy rules from this config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check gateway status
    Status,
    /// Show the live tenancy rules
    Tenancy,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { target, config } => {
            let table = match config {
                Some(path) => RoutingTable::from_config(&load_config(&path)?),
                None => RoutingTable::default(),
            };
            let result = resolve_url(&table, &target)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Status => admin_get(&cli.url, &cli.key, "/admin/status").await?,
        Commands::Tenancy => admin_get(&cli.url, &cli.key, "/admin/tenancy").await?,
    }

    Ok(())
}

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid target URL: {0}")]
    InvalidTarget(#[from] InvalidUri),

    #[error("target URL has no host: {0}")]
    MissingHost(String),

    #[error("admin API returned status {status}: {body}")]
    Admin {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Route `target` exactly as the gateway would see it: host and path bytes
/// are taken verbatim, without case folding or dot-segment removal.
fn resolve_url(table: &RoutingTable, target: &str) -> Result<ResolveResult, CliError> {
    let uri: Uri = target.parse()?;
    let host = match (uri.host(), uri.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port.as_str()),
        (Some(host), None) => host.to_string(),
        (None, _) => return Err(CliError::MissingHost(target.to_string())),
    };
    let outcome = table.route_parts(Some(&host), uri.path());
    Ok(ResolveResult::from_outcome(&outcome, uri.path()))
}

async fn admin_get(base: &str, key: &str, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);

    let res = reqwest::Client::new()
        .get(format!("{}{}", base.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(CliError::Admin { status, body }.into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
