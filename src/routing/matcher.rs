//! Path matching for the tenant routing exclusion boundary.
//!
//! # Responsibilities
//! - Match path prefixes (`/api`, `/_next/static`, ...)
//! - Match exact paths (`/favicon.ico`)
//! - Combine conditions with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Empty matcher set never matches
//! - No regex to guarantee O(n) matching

use crate::config::ExclusionConfig;

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches one exact path.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

/// Paths the tenant rewrite never sees: API routes, framework static
/// assets and the favicon.
#[derive(Debug)]
pub struct ExclusionMatcher {
    inner: AnyMatcher,
    prefixes: Vec<String>,
    exact: Vec<String>,
}

impl ExclusionMatcher {
    pub fn new(prefixes: Vec<String>, exact: Vec<String>) -> Self {
        let mut matchers: Vec<Box<dyn Matcher>> = Vec::with_capacity(prefixes.len() + exact.len());
        for prefix in &prefixes {
            matchers.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }
        for path in &exact {
            matchers.push(Box::new(ExactPathMatcher::new(path.clone())));
        }
        Self {
            inner: AnyMatcher::new(matchers),
            prefixes,
            exact,
        }
    }

    pub fn from_config(config: &ExclusionConfig) -> Self {
        Self::new(config.path_prefixes.clone(), config.exact_paths.clone())
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    pub fn exact_paths(&self) -> &[String] {
        &self.exact
    }
}

impl Matcher for ExclusionMatcher {
    fn matches(&self, path: &str) -> bool {
        self.inner.matches(path)
    }
}

impl Default for ExclusionMatcher {
    fn default() -> Self {
        Self::from_config(&ExclusionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api");
        assert!(matcher.matches("/api/v1/orders"));
        assert!(matcher.matches("/api"));
        assert!(!matcher.matches("/images"));
    }

    #[test]
    fn test_exact_matcher() {
        let matcher = ExactPathMatcher::new("/favicon.ico");
        assert!(matcher.matches("/favicon.ico"));
        assert!(!matcher.matches("/favicon.ico.bak"));
        assert!(!matcher.matches("/assets/favicon.ico"));
    }

    #[test]
    fn empty_any_matcher_never_matches() {
        let matcher = AnyMatcher::default();
        assert!(!matcher.matches("/"));
    }

    #[test]
    fn default_exclusions() {
        let matcher = ExclusionMatcher::default();
        assert!(matcher.matches("/api/products"));
        assert!(matcher.matches("/_next/static/chunks/main.js"));
        assert!(matcher.matches("/_next/image?url=%2Flogo.png&w=64"));
        assert!(matcher.matches("/favicon.ico"));

        assert!(!matcher.matches("/"));
        assert!(!matcher.matches("/products"));
        assert!(!matcher.matches("/_next/data/build/index.json"));
        assert!(!matcher.matches("/store/shop1"));
    }
}
