//! Longest-prefix-first ACL resolution.
//!
//! For a resource path `a/b/c` the keys `a/b/c`, `a/b`, `a` are tried in
//! that order. The first key that exists decides, whether its rules allow
//! or not; shorter prefixes are never consulted after that. Only when no
//! prefix exists is `default` evaluated, and a missing `default` denies.

use serde::Serialize;

use crate::session::SessionState;

use super::rule::AclRule;
use super::table::{AclTable, DEFAULT_KEY};

/// Final answer for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDecision {
    /// The caller may proceed.
    Allow,
    /// The caller may not proceed.
    Deny,
}

impl AccessDecision {
    /// Whether this is [`AccessDecision::Allow`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Result of looking up one exact key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AclLookup {
    /// The key is not in the table; keep searching.
    NotFound,
    /// The key exists and its rules produced a decision; stop searching.
    Found(AccessDecision),
}

/// A decision plus what produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// The decision.
    pub decision: AccessDecision,
    /// Table key that decided, `None` when nothing (not even `default`) existed.
    pub matched_key: Option<String>,
    /// Rule that allowed, `None` on deny.
    pub matched_rule: Option<AclRule>,
}

/// Evaluates resource paths against an [`AclTable`].
#[derive(Debug, Clone, Default)]
pub struct AclResolver {
    table: AclTable,
}

impl AclResolver {
    /// Creates a resolver over `table`.
    pub fn new(table: AclTable) -> Self {
        Self { table }
    }

    /// The underlying table.
    pub fn table(&self) -> &AclTable {
        &self.table
    }

    /// Allow or deny `resource_path` for `state`.
    pub fn authorize(&self, resource_path: &str, state: &SessionState) -> AccessDecision {
        self.resolve(resource_path, state).decision
    }

    /// Looks up exactly `key`.
    pub fn lookup(&self, key: &str, state: &SessionState) -> AclLookup {
        match self.evaluate_key(key, state) {
            None => AclLookup::NotFound,
            Some((decision, _)) => AclLookup::Found(decision),
        }
    }

    /// Full resolution with the deciding key and rule.
    pub fn resolve(&self, resource_path: &str, state: &SessionState) -> Resolution {
        let segments: Vec<&str> = if resource_path.is_empty() {
            Vec::new()
        } else {
            resource_path.split('/').collect()
        };

        for len in (1..=segments.len()).rev() {
            let chunk = segments[..len].join("/");
            tracing::debug!(acl = %chunk, "Checking ACL");
            if let Some((decision, rule)) = self.evaluate_key(&chunk, state) {
                return Resolution {
                    decision,
                    matched_key: Some(chunk),
                    matched_rule: rule,
                };
            }
        }

        match self.evaluate_key(DEFAULT_KEY, state) {
            Some((decision, rule)) => Resolution {
                decision,
                matched_key: Some(DEFAULT_KEY.to_string()),
                matched_rule: rule,
            },
            None => Resolution {
                decision: AccessDecision::Deny,
                matched_key: None,
                matched_rule: None,
            },
        }
    }

    /// `None` when the key is absent; otherwise the decision and the
    /// allowing rule, if any.
    fn evaluate_key(
        &self,
        key: &str,
        state: &SessionState,
    ) -> Option<(AccessDecision, Option<AclRule>)> {
        let rules = self.table.get(key)?;
        let allowing = rules.iter().find(|rule| rule.matches(state));
        Some(match allowing {
            Some(rule) => (AccessDecision::Allow, Some(rule.clone())),
            None => (AccessDecision::Deny, None),
        })
    }
}
