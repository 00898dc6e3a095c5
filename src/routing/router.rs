//! Routing table lookup.
//!
//! # Responsibilities
//! - Hold the compiled exclusion matcher and tenant rules
//! - Evaluate a request: excluded, or a tenant routing decision
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Reload builds a new table and swaps it atomically
//! - Exclusions are checked before any host parsing

use crate::config::GatewayConfig;
use crate::routing::matcher::{ExclusionMatcher, Matcher};
use crate::routing::tenant::{RoutingDecision, RoutingRequest, TenantRules};

/// Result of a routing table lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Path is outside the tenant rewrite boundary.
    Excluded,
    /// Path was evaluated by the tenant rules.
    Decided(RoutingDecision),
}

impl RouteOutcome {
    pub fn outcome(&self) -> &'static str {
        match self {
            RouteOutcome::Excluded => "excluded",
            RouteOutcome::Decided(decision) => decision.outcome(),
        }
    }
}

/// Compiled routing state shared by all requests.
#[derive(Debug, Default)]
pub struct RoutingTable {
    rules: TenantRules,
    exclusions: ExclusionMatcher,
}

impl RoutingTable {
    pub fn new(rules: TenantRules, exclusions: ExclusionMatcher) -> Self {
        Self { rules, exclusions }
    }

    /// Compile the routing table from configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            TenantRules::from_config(&config.tenancy),
            ExclusionMatcher::from_config(&config.exclusions),
        )
    }

    pub fn rules(&self) -> &TenantRules {
        &self.rules
    }

    pub fn exclusions(&self) -> &ExclusionMatcher {
        &self.exclusions
    }

    /// Look up the outcome for a request.
    pub fn route<R: RoutingRequest + ?Sized>(&self, request: &R) -> RouteOutcome {
        self.route_parts(request.host(), request.path())
    }

    pub fn route_parts(&self, host: Option<&str>, path: &str) -> RouteOutcome {
        if self.exclusions.matches(path) {
            return RouteOutcome::Excluded;
        }
        RouteOutcome::Decided(self.rules.decide_parts(host, path))
    }
}
