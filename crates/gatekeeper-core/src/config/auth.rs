//! Identity provider and gateway mode configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What the gateway does once a request is authorized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    /// Request a presigned URL and redirect the caller to it.
    #[default]
    Integrated,
    /// Only answer the authorization question; the caller fetches the object.
    AuthorizationOnly,
}

impl fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integrated => write!(f, "integrated"),
            Self::AuthorizationOnly => write!(f, "authorization_only"),
        }
    }
}

/// Identity provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Login endpoint callers are redirected to. Required.
    #[serde(default, alias = "authurl")]
    pub auth_url: String,
    /// Gateway completion mode.
    #[serde(default)]
    pub mode: GatewayMode,
}
