//! `GatewayRequest` extractor: pins the live snapshot and pulls the session
//! cookie and host out of the request.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use axum_extra::headers::{HeaderMapExt, Host};

use gatekeeper_service::{GatewaySnapshot, RequestContext};

use crate::state::AppState;

/// Transport details of an object request, read under one snapshot.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    /// Snapshot the cookie was read under; the flow must use the same one.
    pub snapshot: Arc<GatewaySnapshot>,
    /// Session cookie value, if present.
    pub session_token: Option<String>,
    /// Host the caller addressed.
    pub host: Option<String>,
    /// Original path and query.
    pub path_and_query: String,
}

impl GatewayRequest {
    /// Completes a flow context with the resource parameters.
    pub fn into_context(self, bucket: Option<String>, path: Option<String>) -> RequestContext {
        RequestContext::new(
            bucket,
            path,
            self.session_token,
            self.host,
            self.path_and_query,
        )
    }
}

impl FromRequestParts<AppState> for GatewayRequest {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let snapshot = state.store().current();

        let jar = CookieJar::from_headers(&parts.headers);
        let session_token = jar
            .get(snapshot.codec().cookie_name())
            .map(|cookie| cookie.value().to_string());

        let host = parts
            .headers
            .typed_get::<Host>()
            .map(|host| match host.port() {
                Some(port) => format!("{}:{}", host.hostname(), port),
                None => host.hostname().to_string(),
            })
            .or_else(|| parts.uri.authority().map(|a| a.to_string()));

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());

        Ok(Self {
            snapshot,
            session_token,
            host,
            path_and_query,
        })
    }
}
