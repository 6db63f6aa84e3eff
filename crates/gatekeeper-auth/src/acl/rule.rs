//! A single ACL rule string and how it matches a session.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use gatekeeper_core::error::AppError;

use crate::session::SessionState;

/// Rule literal that admits every caller.
pub const ANONYMOUS: &str = "anonymous";

/// A parsed ACL rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AclRule {
    /// `anonymous`: always allows.
    Anonymous,
    /// `<group>`: any membership in the group.
    Group(String),
    /// `<group>/<subgroup>`: that sub-group within the group.
    Subgroup {
        /// Group name.
        group: String,
        /// Sub-group name; may itself contain `/`.
        subgroup: String,
    },
}

impl AclRule {
    /// Whether this rule admits the caller.
    pub fn matches(&self, state: &SessionState) -> bool {
        match self {
            Self::Anonymous => true,
            Self::Group(group) => state
                .session()
                .is_some_and(|session| session.is_member_of(group)),
            Self::Subgroup { group, subgroup } => state
                .session()
                .is_some_and(|session| session.has_subgroup(group, subgroup)),
        }
    }
}

impl FromStr for AclRule {
    type Err = AppError;

    /// Splits on the first `/` only: `a/b/c` is group `a`, sub-group `b/c`.
    fn from_str(rule: &str) -> Result<Self, Self::Err> {
        if rule == ANONYMOUS {
            return Ok(Self::Anonymous);
        }

        match rule.split_once('/') {
            None if !rule.is_empty() => Ok(Self::Group(rule.to_string())),
            Some((group, subgroup)) if !group.is_empty() && !subgroup.is_empty() => {
                Ok(Self::Subgroup {
                    group: group.to_string(),
                    subgroup: subgroup.to_string(),
                })
            }
            _ => Err(AppError::configuration(format!("invalid ACL rule '{rule}'"))),
        }
    }
}

impl fmt::Display for AclRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => write!(f, "{ANONYMOUS}"),
            Self::Group(group) => write!(f, "{group}"),
            Self::Subgroup { group, subgroup } => write!(f, "{group}/{subgroup}"),
        }
    }
}

impl Serialize for AclRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
