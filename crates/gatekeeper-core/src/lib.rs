//! # gatekeeper-core
//!
//! Core crate for Gatekeeper. Contains configuration schemas and sources,
//! the collaborator traits (link issuing, config fetching), and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Gatekeeper crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
