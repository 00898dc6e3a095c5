use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::routing::{RouteOutcome, RoutingDecision};

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TenancySummary {
    pub reserved_subdomains: Vec<String>,
    pub store_prefix: String,
    pub excluded_prefixes: Vec<String>,
    pub excluded_paths: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub host: Option<String>,
    #[serde(default = "root_path")]
    pub path: String,
}

fn root_path() -> String {
    "/".to_string()
}

/// Dry-run routing result.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveResult {
    pub outcome: String,
    pub tenant: Option<String>,
    pub path: String,
}

impl ResolveResult {
    pub fn from_outcome(outcome: &RouteOutcome, original_path: &str) -> Self {
        match outcome {
            RouteOutcome::Decided(RoutingDecision::Rewrite { tenant, path }) => Self {
                outcome: outcome.outcome().to_string(),
                tenant: Some(tenant.clone()),
                path: path.clone(),
            },
            _ => Self {
                outcome: outcome.outcome().to_string(),
                tenant: None,
                path: original_path.to_string(),
            },
        }
    }
}

pub async fn get_status() -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
    })
}

pub async fn get_tenancy(State(state): State<AdminState>) -> Json<TenancySummary> {
    let table = state.table.load();
    Json(TenancySummary {
        reserved_subdomains: table.rules().reserved(),
        store_prefix: table.rules().store_prefix().to_string(),
        excluded_prefixes: table.exclusions().prefixes().to_vec(),
        excluded_paths: table.exclusions().exact_paths().to_vec(),
    })
}

pub async fn resolve(
    State(state): State<AdminState>,
    Query(query): Query<ResolveQuery>,
) -> Json<ResolveResult> {
    let outcome = state
        .table
        .load()
        .route_parts(query.host.as_deref(), &query.path);
    Json(ResolveResult::from_outcome(&outcome, &query.path))
}
