//! Application configuration schemas.
//!
//! The raw document (TOML or JSON) is fetched from a [`ConfigSource`],
//! layered with `GATEKEEPER_`-prefixed environment variables via the
//! `config` crate, and deserialized into [`AppConfig`]. Each sub-module
//! represents a logical configuration section.
//!
//! [`ConfigSource`]: crate::traits::ConfigSource

pub mod app;
pub mod auth;
pub mod logging;
pub mod reload;
pub mod session;
pub mod source;
pub mod storage;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::{AuthConfig, GatewayMode};
pub use self::logging::LoggingConfig;
pub use self::reload::ReloadConfig;
pub use self::session::SessionConfig;
pub use self::source::{ConfigFormat, ConfigLocation, FileConfigSource, RawConfig};
pub use self::storage::StorageConfig;

use crate::error::AppError;
use crate::traits::ConfigSource;

/// Environment variable naming the configuration location.
pub const CONFIG_LOCATION_ENV: &str = "GATEKEEPER_CONFIG";

/// Location used when [`CONFIG_LOCATION_ENV`] is unset.
pub const DEFAULT_CONFIG_LOCATION: &str = "config/default.toml";

/// Prefix for environment overrides (`GATEKEEPER_SESSION__SIGN_KEY`, ...).
const ENV_PREFIX: &str = "GATEKEEPER";

/// Placeholder shown instead of key material.
const REDACTED: &str = "********";

/// Prefix-keyed ACL table as written in configuration.
pub type AclRules = BTreeMap<String, Vec<String>>;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Object store settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session token settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Identity provider and gateway mode.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Resource-path prefix to rule list.
    #[serde(default)]
    pub acls: AclRules,
    /// Reload cadence.
    #[serde(default)]
    pub reload: ReloadConfig,
}

impl AppConfig {
    /// Fetch, layer, deserialize, and validate configuration from a source.
    pub async fn load(source: &dyn ConfigSource) -> Result<Self, AppError> {
        let raw = source.fetch().await?;
        let config = Self::from_raw(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer a raw document with environment overrides and deserialize it.
    ///
    /// Does not validate; call [`AppConfig::validate`] afterwards.
    pub fn from_raw(raw: &RawConfig) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                &raw.contents,
                config::FileFormat::from(raw.format),
            ))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Check the invariants that must hold before the gateway may serve.
    ///
    /// Key *length* is checked when the keys are decoded by the session
    /// codec; here only presence is enforced.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.session.sign_key.trim().is_empty() || self.session.enc_key.trim().is_empty() {
            return Err(AppError::configuration(
                "signing and encryption keys not set",
            ));
        }
        if self.auth.auth_url.trim().is_empty() {
            return Err(AppError::configuration("auth url not set"));
        }
        if self.session.lifetime == 0 {
            return Err(AppError::configuration("session lifetime must be positive"));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(AppError::configuration("session cookie name not set"));
        }
        if self.reload.poll_interval_seconds == 0 {
            return Err(AppError::configuration(
                "reload poll interval must be positive",
            ));
        }
        if self.storage.link_expiry_seconds == 0 {
            return Err(AppError::configuration("link expiry must be positive"));
        }
        Ok(())
    }

    /// A copy safe to print: key material replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.session.sign_key = REDACTED.to_string();
        copy.session.enc_key = REDACTED.to_string();
        if !copy.storage.secret_key.is_empty() {
            copy.storage.secret_key = REDACTED.to_string();
        }
        copy
    }
}

/// Resolve the configuration location from the environment.
pub fn location_from_env() -> String {
    std::env::var(CONFIG_LOCATION_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_LOCATION.to_string())
}
