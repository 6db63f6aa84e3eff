//! Bucket plus object key, and the ACL path derived from them.

use std::fmt;

use serde::Serialize;

use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;

/// A validated object address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourcePath {
    bucket: String,
    key: String,
}

impl ResourcePath {
    /// Builds a resource path; both parts must be non-empty.
    ///
    /// The key is kept byte-for-byte: `/a` and `a` are different objects and
    /// resolve against different ACL paths.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> AppResult<Self> {
        let bucket = bucket.into();
        let key = key.into();

        if bucket.is_empty() || bucket.contains('/') {
            return Err(AppError::validation("invalid bucket"));
        }
        if key.is_empty() {
            return Err(AppError::validation("missing object path"));
        }

        Ok(Self { bucket, key })
    }

    /// Builds a resource path from optional request parameters.
    pub fn from_params(bucket: Option<&str>, key: Option<&str>) -> AppResult<Self> {
        match (bucket, key) {
            (Some(bucket), Some(key)) => Self::new(bucket, key),
            _ => Err(AppError::validation("bucket and path are required")),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The path the ACL resolver is consulted with: `bucket/key`.
    pub fn acl_path(&self) -> String {
        format!("{}/{}", self.bucket, self.key)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}
