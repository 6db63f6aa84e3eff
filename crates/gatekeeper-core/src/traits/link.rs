//! Trait for issuing short-lived download links.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A pre-authorized download URL and when it stops working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedLink {
    /// The presigned URL.
    pub url: String,
    /// Expiration instant.
    pub expires_at: DateTime<Utc>,
}

/// Backing object store capable of presigning GET requests.
///
/// Implementations must report every failure as
/// [`ErrorKind::ExternalService`](crate::error::ErrorKind::ExternalService)
/// with a generic message; causes go into the error source.
#[async_trait]
pub trait LinkIssuer: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "s3").
    fn provider_type(&self) -> &str;

    /// Presign a GET for exactly `bucket`/`key`.
    async fn issue_link(&self, bucket: &str, key: &str) -> AppResult<SignedLink>;
}
