//! Opening the configuration source named by `GATEKEEPER_CONFIG`.

use std::sync::Arc;

use gatekeeper_core::config::{AppConfig, ConfigFormat, ConfigLocation, FileConfigSource, RawConfig};
#[cfg(not(feature = "s3"))]
use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::ConfigSource;

/// Storage settings available before any document is read: defaults plus
/// `GATEKEEPER_STORAGE__*` environment overrides.
pub fn bootstrap_config() -> AppResult<AppConfig> {
    AppConfig::from_raw(&RawConfig {
        contents: String::new(),
        format: ConfigFormat::Toml,
    })
}

/// Opens the source for `location`.
///
/// An `s3://` location needs a client before the document it configures has
/// been read, so the client is built from [`bootstrap_config`].
pub async fn open_config_source(location: &ConfigLocation) -> AppResult<Arc<dyn ConfigSource>> {
    match location {
        ConfigLocation::File(path) => Ok(Arc::new(FileConfigSource::new(path.clone()))),
        #[cfg(feature = "s3")]
        ConfigLocation::S3 { bucket, key } => {
            let bootstrap = bootstrap_config()?;
            let client = crate::providers::s3::build_client(&bootstrap.storage).await;
            Ok(Arc::new(crate::providers::s3::S3ConfigSource::new(
                client,
                bucket.clone(),
                key.clone(),
            )))
        }
        #[cfg(not(feature = "s3"))]
        ConfigLocation::S3 { .. } => Err(AppError::configuration(
            "s3 configuration locations require the s3 feature",
        )),
    }
}
