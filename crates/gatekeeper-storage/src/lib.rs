//! # gatekeeper-storage
//!
//! Backing object store integration for Gatekeeper: presigned download
//! links and configuration documents kept in the store.

pub mod providers;
pub mod source;

#[cfg(feature = "s3")]
pub use providers::s3::{S3ConfigSource, S3LinkIssuer, build_client};
pub use source::{bootstrap_config, open_config_source};
