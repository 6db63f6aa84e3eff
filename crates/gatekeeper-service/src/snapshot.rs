//! Immutable configuration snapshots and the store that swaps them.
//!
//! Every request reads exactly one snapshot from start to finish. A reload
//! builds a complete new snapshot off to the side and publishes it in one
//! step, so no request ever observes keys from one document and ACLs from
//! another.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use url::Url;

use gatekeeper_auth::{AclResolver, AclTable, SessionCodec};
use gatekeeper_core::config::{AppConfig, GatewayMode};
use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;

/// Everything the flow needs from configuration, fully parsed.
#[derive(Debug, Clone)]
pub struct GatewaySnapshot {
    codec: SessionCodec,
    acl: AclResolver,
    auth_url: Url,
    mode: GatewayMode,
    loaded_at: DateTime<Utc>,
}

impl GatewaySnapshot {
    /// Validates `config` and builds a snapshot from it.
    ///
    /// Fails on missing keys, undecodable keys, a malformed auth URL, or any
    /// malformed ACL rule. A failure here never affects the live snapshot.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let codec = SessionCodec::from_config(&config.session)?;
        let acl = AclResolver::new(AclTable::from_rules(&config.acls)?);
        let auth_url = parse_auth_url(&config.auth.auth_url)?;

        Ok(Self {
            codec,
            acl,
            auth_url,
            mode: config.auth.mode,
            loaded_at: Utc::now(),
        })
    }

    /// Session codec for this configuration.
    pub fn codec(&self) -> &SessionCodec {
        &self.codec
    }

    /// ACL resolver for this configuration.
    pub fn acl(&self) -> &AclResolver {
        &self.acl
    }

    /// Identity provider login endpoint.
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Completion mode.
    pub fn mode(&self) -> GatewayMode {
        self.mode
    }

    /// When this snapshot was built.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// The login URL carrying `return_url` as its `redirect` parameter.
    ///
    /// Existing query parameters on the auth URL are kept.
    pub fn login_redirect(&self, return_url: &str) -> String {
        let mut location = self.auth_url.clone();
        location
            .query_pairs_mut()
            .append_pair("redirect", return_url);
        location.to_string()
    }
}

fn parse_auth_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::configuration(format!("auth url '{raw}' is invalid: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::configuration(format!(
            "auth url must be http or https, got '{other}'"
        ))),
    }
}

/// Holds the live snapshot and publishes replacements atomically.
#[derive(Debug)]
pub struct SnapshotStore {
    tx: watch::Sender<Arc<GatewaySnapshot>>,
}

impl SnapshotStore {
    /// Creates a store whose first live snapshot is `initial`.
    pub fn new(initial: GatewaySnapshot) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx }
    }

    /// The live snapshot. Callers hold the `Arc` for the whole request.
    pub fn current(&self) -> Arc<GatewaySnapshot> {
        self.tx.borrow().clone()
    }

    /// Replaces the live snapshot, returning the previous one.
    pub fn publish(&self, snapshot: GatewaySnapshot) -> Arc<GatewaySnapshot> {
        let previous = self.tx.send_replace(Arc::new(snapshot));
        tracing::info!(
            previous_loaded_at = %previous.loaded_at,
            "Published new configuration snapshot"
        );
        previous
    }

    /// Receiver notified on every publish.
    pub fn subscribe(&self) -> watch::Receiver<Arc<GatewaySnapshot>> {
        self.tx.subscribe()
    }
}
