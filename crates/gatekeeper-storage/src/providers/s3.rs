//! S3-compatible object store provider.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use chrono::Utc;

use gatekeeper_core::config::{ConfigFormat, RawConfig, StorageConfig};
use gatekeeper_core::error::{AppError, ErrorKind};
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::{ConfigSource, LinkIssuer, SignedLink};

/// Message returned to callers for every presign failure.
const SIGNED_URL_FAILURE: &str = "failed to load signed url";

/// Build an S3 client from storage configuration.
///
/// Static credentials are used when both keys are set; otherwise the AWS
/// default provider chain is consulted.
pub async fn build_client(config: &StorageConfig) -> Client {
    tracing::info!(
        endpoint = %config.endpoint,
        region = %config.region,
        force_path_style = config.force_path_style,
        "Initializing S3 client"
    );

    let shared = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;

    let mut builder = aws_sdk_s3::config::Builder::from(&shared);
    if !config.endpoint.is_empty() {
        builder = builder.endpoint_url(&config.endpoint);
    }
    if config.force_path_style {
        builder = builder.force_path_style(true);
    }
    if !config.access_key.is_empty() && !config.secret_key.is_empty() {
        builder = builder.credentials_provider(static_credentials(config));
    }

    Client::from_conf(builder.build())
}

fn static_credentials(config: &StorageConfig) -> Credentials {
    Credentials::new(
        config.access_key.clone(),
        config.secret_key.clone(),
        None,
        None,
        "gatekeeper-config",
    )
}

/// Issues presigned GET URLs.
#[derive(Debug, Clone)]
pub struct S3LinkIssuer {
    client: Client,
    expiry: Duration,
}

impl S3LinkIssuer {
    /// Create an issuer whose links live for `expiry`.
    pub fn new(client: Client, expiry: Duration) -> Self {
        Self { client, expiry }
    }

    /// Create an issuer using the configured link expiry.
    pub fn from_config(client: Client, config: &StorageConfig) -> Self {
        Self::new(client, Duration::from_secs(config.link_expiry_seconds))
    }
}

#[async_trait]
impl LinkIssuer for S3LinkIssuer {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn issue_link(&self, bucket: &str, key: &str) -> AppResult<SignedLink> {
        let presigning = PresigningConfig::expires_in(self.expiry).map_err(|e| {
            tracing::error!(error = %e, "Invalid presigning configuration");
            AppError::external_service(SIGNED_URL_FAILURE)
        })?;

        let request = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                tracing::error!(
                    bucket,
                    key,
                    error = %DisplayErrorContext(&e),
                    "Failed to presign object URL"
                );
                AppError::external_service(SIGNED_URL_FAILURE)
            })?;

        let expires_at = Utc::now()
            + chrono::Duration::from_std(self.expiry).unwrap_or(chrono::Duration::zero());

        Ok(SignedLink {
            url: request.uri().to_string(),
            expires_at,
        })
    }
}

/// Reads the configuration document from an object in the store.
#[derive(Debug, Clone)]
pub struct S3ConfigSource {
    client: Client,
    bucket: String,
    key: String,
}

impl S3ConfigSource {
    /// Create a source for `s3://bucket/key`.
    pub fn new(client: Client, bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

#[async_trait]
impl ConfigSource for S3ConfigSource {
    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    async fn fetch(&self) -> AppResult<RawConfig> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .send()
            .await
            .map_err(|e| {
                AppError::configuration(format!(
                    "Failed to fetch config {}: {}",
                    self.location(),
                    DisplayErrorContext(&e)
                ))
            })?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to read config {}", self.location()),
                    e,
                )
            })?
            .into_bytes();

        let contents = String::from_utf8(bytes.to_vec()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Config {} is not UTF-8", self.location()),
                e,
            )
        })?;

        Ok(RawConfig {
            contents,
            format: ConfigFormat::from_name(&self.key),
        })
    }
}
