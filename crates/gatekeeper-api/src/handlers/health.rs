//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /healthz
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let snapshot = state.store().current();

    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: snapshot.mode().to_string(),
        snapshot_loaded_at: snapshot.loaded_at(),
        acl_keys: snapshot.acl().table().len(),
    }))
}
