//! Prefix-scoped access control: rule parsing, the immutable rule table,
//! and longest-prefix-first resolution with a `default` fallback.

pub mod resolver;
pub mod rule;
pub mod table;

pub use resolver::{AccessDecision, AclLookup, AclResolver, Resolution};
pub use rule::AclRule;
pub use table::{AclTable, DEFAULT_KEY};
