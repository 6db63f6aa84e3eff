//! # gatekeeper-auth
//!
//! Authorization core for Gatekeeper.
//!
//! ## Modules
//!
//! - `session`: stateless signed + encrypted session tokens
//! - `acl`: prefix-scoped access rules with longest-prefix-first resolution

pub mod acl;
pub mod session;

pub use acl::{AccessDecision, AclLookup, AclResolver, AclRule, AclTable, Resolution};
pub use session::{Memberships, Session, SessionCodec, SessionKeys, SessionState};
