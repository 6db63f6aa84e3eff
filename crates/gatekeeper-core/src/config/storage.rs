//! Object store configuration.

use serde::{Deserialize, Serialize};

/// S3-compatible object store settings.
///
/// Credentials left empty fall back to the AWS default provider chain
/// (environment, profile, instance role).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Custom endpoint URL (MinIO and other S3-compatible services).
    #[serde(default)]
    pub endpoint: String,
    /// AWS region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Use path-style addressing (required by most non-AWS services).
    #[serde(default)]
    pub force_path_style: bool,
    /// Static access key ID.
    #[serde(default)]
    pub access_key: String,
    /// Static secret access key.
    #[serde(default)]
    pub secret_key: String,
    /// Lifetime of issued download links in seconds.
    #[serde(default = "default_link_expiry")]
    pub link_expiry_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            region: default_region(),
            force_path_style: false,
            access_key: String::new(),
            secret_key: String::new(),
            link_expiry_seconds: default_link_expiry(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_link_expiry() -> u64 {
    60
}
