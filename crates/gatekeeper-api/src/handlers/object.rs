//! Object request handlers.
//!
//! Both routes feed the same flow; they differ only in where `bucket` and
//! `path` come from.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderName, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use gatekeeper_core::error::AppError;
use gatekeeper_service::FlowOutcome;

use crate::error::ApiError;
use crate::extractors::GatewayRequest;
use crate::state::AppState;

/// Header naming the authorized login in authorization-only mode.
pub const LOGIN_HEADER: HeaderName = HeaderName::from_static("x-gatekeeper-login");

/// Query parameters of `GET /`.
#[derive(Debug, Deserialize)]
pub struct ObjectQuery {
    /// Bucket name.
    pub bucket: Option<String>,
    /// Object key.
    pub path: Option<String>,
}

/// GET /?bucket=..&path=..
pub async fn object_by_query(
    State(state): State<AppState>,
    Query(query): Query<ObjectQuery>,
    request: GatewayRequest,
) -> Result<Response, ApiError> {
    serve(&state, request, query.bucket, query.path).await
}

/// GET /{bucket}/{*path}
pub async fn object_by_path(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
    request: GatewayRequest,
) -> Result<Response, ApiError> {
    serve(&state, request, Some(bucket), Some(path)).await
}

async fn serve(
    state: &AppState,
    request: GatewayRequest,
    bucket: Option<String>,
    path: Option<String>,
) -> Result<Response, ApiError> {
    let snapshot = request.snapshot.clone();
    let ctx = request.into_context(bucket, path);
    let outcome = state.flow.handle_with(&snapshot, &ctx).await?;
    outcome_response(outcome)
}

/// Maps a terminal flow state to its HTTP response.
pub fn outcome_response(outcome: FlowOutcome) -> Result<Response, ApiError> {
    match outcome {
        FlowOutcome::BadRequest { reason } => Err(AppError::validation(reason).into()),
        FlowOutcome::Forbidden { .. } => Err(AppError::authorization("not authorized").into()),
        FlowOutcome::RedirectToLogin { location } => Ok(no_store(Redirect::to(&location))),
        FlowOutcome::Download { link, .. } => Ok(no_store(Redirect::to(&link.url))),
        FlowOutcome::Granted { login, .. } => {
            let value = HeaderValue::from_str(&login).map_err(|_| {
                AppError::internal(format!("login '{login}' is not a valid header value"))
            })?;
            Ok((StatusCode::NO_CONTENT, [(LOGIN_HEADER, value)]).into_response())
        }
    }
}

fn no_store(redirect: Redirect) -> Response {
    let mut response = redirect.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
