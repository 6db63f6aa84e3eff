//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the process can answer.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Gateway completion mode of the live snapshot.
    pub mode: String,
    /// When the live snapshot was built.
    pub snapshot_loaded_at: DateTime<Utc>,
    /// Number of ACL keys in the live snapshot.
    pub acl_keys: usize,
}
