//! # gatekeeper-api
//!
//! HTTP layer for Gatekeeper built on Axum.
//!
//! Provides the object and health endpoints, request logging middleware,
//! the request extractor, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::ApiError;
pub use state::AppState;
