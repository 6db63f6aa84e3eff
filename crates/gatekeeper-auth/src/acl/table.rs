//! Immutable prefix-keyed rule table.

use std::collections::HashMap;

use gatekeeper_core::config::AclRules;
use gatekeeper_core::error::AppError;

use super::rule::AclRule;

/// Reserved key consulted when no prefix of the path has an entry.
pub const DEFAULT_KEY: &str = "default";

/// Parsed ACL table. Built once per configuration snapshot and never mutated.
#[derive(Debug, Clone, Default)]
pub struct AclTable {
    entries: HashMap<String, Vec<AclRule>>,
}

impl AclTable {
    /// Parses every rule in the configured table.
    ///
    /// A single malformed rule rejects the whole table.
    pub fn from_rules(rules: &AclRules) -> Result<Self, AppError> {
        let mut entries = HashMap::with_capacity(rules.len());
        for (key, list) in rules {
            let parsed = list
                .iter()
                .map(|rule| {
                    rule.parse::<AclRule>().map_err(|e| {
                        AppError::configuration(format!("ACL '{key}': {}", e.message))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            entries.insert(key.clone(), parsed);
        }
        Ok(Self { entries })
    }

    /// Rules for exactly `key`, if the key exists.
    pub fn get(&self, key: &str) -> Option<&[AclRule]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of keys, including `default`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no keys at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a `default` entry exists.
    pub fn has_default(&self) -> bool {
        self.entries.contains_key(DEFAULT_KEY)
    }
}
