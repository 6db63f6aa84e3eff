//! Session token configuration.

use serde::{Deserialize, Serialize};

/// Session token and cookie settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session validity in seconds from issuance.
    #[serde(default = "default_lifetime")]
    pub lifetime: u64,
    /// Cookie domain the token is bound to.
    #[serde(default)]
    pub domain: String,
    /// Name of the cookie carrying the token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Base64url-encoded HMAC signing key.
    #[serde(default, alias = "signkey")]
    pub sign_key: String,
    /// Base64url-encoded AES encryption key (16 or 32 bytes decoded).
    #[serde(default, alias = "enckey")]
    pub enc_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: default_lifetime(),
            domain: String::new(),
            cookie_name: default_cookie_name(),
            sign_key: String::new(),
            enc_key: String::new(),
        }
    }
}

fn default_lifetime() -> u64 {
    86400
}

fn default_cookie_name() -> String {
    "session".to_string()
}
