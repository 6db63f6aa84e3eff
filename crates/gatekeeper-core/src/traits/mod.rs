//! Collaborator traits implemented outside the core crate.

pub mod config_source;
pub mod link;

pub use config_source::ConfigSource;
pub use link::{LinkIssuer, SignedLink};
