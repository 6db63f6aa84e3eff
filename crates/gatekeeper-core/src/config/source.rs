//! Raw configuration documents and where they come from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::AppError;
use crate::result::AppResult;
use crate::traits::ConfigSource;

/// Serialization format of a raw configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl ConfigFormat {
    /// Infer the format from a file name; anything but `.json` is TOML.
    pub fn from_name(name: &str) -> Self {
        let is_json = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json { Self::Json } else { Self::Toml }
    }
}

impl From<ConfigFormat> for config::FileFormat {
    fn from(format: ConfigFormat) -> Self {
        match format {
            ConfigFormat::Toml => config::FileFormat::Toml,
            ConfigFormat::Json => config::FileFormat::Json,
        }
    }
}

/// A configuration document as fetched, before layering and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawConfig {
    /// Document text.
    pub contents: String,
    /// Document format.
    pub format: ConfigFormat,
}

/// Parsed `GATEKEEPER_CONFIG` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Local filesystem path.
    File(PathBuf),
    /// Object in the backing store, written as `s3://bucket/key`.
    S3 {
        /// Bucket holding the document.
        bucket: String,
        /// Object key of the document.
        key: String,
    },
}

impl ConfigLocation {
    /// Parse a location string.
    pub fn parse(location: &str) -> AppResult<Self> {
        let location = location.trim();
        if location.is_empty() {
            return Err(AppError::configuration("config location is empty"));
        }

        match location.strip_prefix("s3://") {
            Some(rest) => {
                let (bucket, key) = rest.split_once('/').ok_or_else(|| {
                    AppError::configuration(format!(
                        "config location '{location}' must be s3://bucket/key"
                    ))
                })?;
                if bucket.is_empty() || key.is_empty() {
                    return Err(AppError::configuration(format!(
                        "config location '{location}' must be s3://bucket/key"
                    )));
                }
                Ok(Self::S3 {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            None => Ok(Self::File(PathBuf::from(location))),
        }
    }
}

/// Reads configuration from a local file.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    /// Create a source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> AppResult<RawConfig> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::with_source(
                crate::error::ErrorKind::Configuration,
                format!("Failed to read config '{}': {e}", self.path.display()),
                e,
            )
        })?;

        Ok(RawConfig {
            contents,
            format: ConfigFormat::from_name(&self.path.to_string_lossy()),
        })
    }
}
