//! Route definitions for the Gatekeeper HTTP API.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{Router, middleware as axum_middleware, routing::get};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the Axum router with all routes and the logging middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(object_routes())
        .merge(health_routes())
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Object access: query style and path style.
fn object_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::object::object_by_query))
        .route("/{bucket}/{*path}", get(handlers::object::object_by_path))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/healthz", get(handlers::health::health))
}
