//! Request context carrying what the flow needs from one inbound request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Transport-independent view of an inbound request.
///
/// Built by the HTTP layer and handed to the flow controller so the state
/// machine never touches headers or cookies directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// `bucket` parameter, if supplied.
    pub bucket: Option<String>,
    /// `path` parameter, if supplied.
    pub path: Option<String>,
    /// Raw session token from the session cookie.
    #[serde(skip_serializing)]
    pub session_token: Option<String>,
    /// Host the caller addressed.
    pub host: Option<String>,
    /// Path and query of the original request, e.g. `/?bucket=a&path=b`.
    pub path_and_query: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(
        bucket: Option<String>,
        path: Option<String>,
        session_token: Option<String>,
        host: Option<String>,
        path_and_query: impl Into<String>,
    ) -> Self {
        Self {
            bucket,
            path,
            session_token,
            host,
            path_and_query: path_and_query.into(),
            request_time: Utc::now(),
        }
    }

    /// The URL the identity provider should send the caller back to.
    ///
    /// Always `https`, whatever scheme the request arrived on.
    pub fn return_url(&self) -> Option<String> {
        let host = self.host.as_deref().filter(|h| !h.is_empty())?;
        let path = if self.path_and_query.starts_with('/') {
            self.path_and_query.clone()
        } else {
            format!("/{}", self.path_and_query)
        };
        Some(format!("https://{host}{path}"))
    }
}
