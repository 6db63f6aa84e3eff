//! Periodic configuration reload.
//!
//! The reloader polls its [`ConfigSource`]. When the document text changes
//! it builds a new [`GatewaySnapshot`] and publishes it; when the build
//! fails the previous snapshot stays live. Listener, logging, reload, and
//! storage settings are read once at startup and ignored on reload.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use gatekeeper_core::config::{AppConfig, RawConfig, ReloadConfig};
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::ConfigSource;

use crate::snapshot::{GatewaySnapshot, SnapshotStore};

/// What one reload attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The document matched the live one; nothing was rebuilt.
    Unchanged,
    /// A new snapshot was published.
    Applied,
}

/// Polls a configuration source and publishes new snapshots.
pub struct ConfigReloader {
    source: Arc<dyn ConfigSource>,
    store: Arc<SnapshotStore>,
    poll_interval: Duration,
    refresh_rate: Duration,
    last_document: Option<RawConfig>,
    last_success: Instant,
}

impl fmt::Debug for ConfigReloader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigReloader")
            .field("source", &self.source.location())
            .field("poll_interval", &self.poll_interval)
            .field("refresh_rate", &self.refresh_rate)
            .finish()
    }
}

impl ConfigReloader {
    /// Creates a reloader.
    ///
    /// `initial` is the document the live snapshot was built from; passing
    /// it avoids a redundant rebuild on the first poll.
    pub fn new(
        source: Arc<dyn ConfigSource>,
        store: Arc<SnapshotStore>,
        reload: &ReloadConfig,
        initial: Option<RawConfig>,
    ) -> Self {
        Self {
            source,
            store,
            poll_interval: reload.poll_interval(),
            refresh_rate: reload.refresh_rate(),
            last_document: initial,
            last_success: Instant::now(),
        }
    }

    /// Fetches the document once and publishes it if it changed.
    ///
    /// Only a document that matches the live one or is published counts as
    /// a successful refresh; fetch and validation failures both age it.
    pub async fn reload_once(&mut self) -> AppResult<ReloadOutcome> {
        let raw = self.source.fetch().await?;

        if self.last_document.as_ref() == Some(&raw) {
            self.last_success = Instant::now();
            tracing::debug!(source = %self.source.location(), "Configuration unchanged");
            return Ok(ReloadOutcome::Unchanged);
        }

        let config = AppConfig::from_raw(&raw)?;
        let snapshot = GatewaySnapshot::from_config(&config)?;
        self.store.publish(snapshot);
        self.last_document = Some(raw);
        self.last_success = Instant::now();

        tracing::info!(
            source = %self.source.location(),
            acls = config.acls.len(),
            mode = %config.auth.mode,
            "Configuration reloaded"
        );
        Ok(ReloadOutcome::Applied)
    }

    /// Whether the last successful fetch is older than the refresh rate.
    pub fn is_stale(&self) -> bool {
        self.last_success.elapsed() > self.refresh_rate
    }

    /// Polls until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            source = %self.source.location(),
            poll_interval_secs = self.poll_interval.as_secs(),
            refresh_rate_secs = self.refresh_rate.as_secs(),
            "Configuration reloader started"
        );

        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.poll_interval,
            self.poll_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.reload_once().await {
                        tracing::error!(
                            source = %self.source.location(),
                            error = %e,
                            "Configuration reload failed; keeping previous snapshot"
                        );
                    }
                    if self.is_stale() {
                        tracing::warn!(
                            source = %self.source.location(),
                            stale_for_secs = self.last_success.elapsed().as_secs(),
                            "Configuration has not been refreshed within the refresh rate"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Configuration reloader stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use gatekeeper_auth::SessionState;
    use gatekeeper_core::config::ConfigFormat;
    use gatekeeper_core::error::AppError;

    use super::*;

    #[derive(Debug)]
    struct MemorySource {
        document: Mutex<Result<String, String>>,
    }

    impl MemorySource {
        fn new(contents: String) -> Arc<Self> {
            Arc::new(Self {
                document: Mutex::new(Ok(contents)),
            })
        }

        fn set(&self, contents: String) {
            *self.document.lock().unwrap() = Ok(contents);
        }

        fn fail(&self, message: &str) {
            *self.document.lock().unwrap() = Err(message.to_string());
        }
    }

    #[async_trait]
    impl ConfigSource for MemorySource {
        fn location(&self) -> String {
            "memory://test".to_string()
        }

        async fn fetch(&self) -> AppResult<RawConfig> {
            match &*self.document.lock().unwrap() {
                Ok(contents) => Ok(RawConfig {
                    contents: contents.clone(),
                    format: ConfigFormat::Json,
                }),
                Err(message) => Err(AppError::configuration(message.clone())),
            }
        }
    }

    fn document(default_rules: &[&str]) -> String {
        let config = crate::snapshot::tests::config_with(&[("default", default_rules)]);
        serde_json::json!({
            "session": {
                "domain": config.session.domain,
                "sign_key": config.session.sign_key,
                "enc_key": config.session.enc_key,
            },
            "auth": { "auth_url": config.auth.auth_url },
            "reload": { "poll_interval_seconds": 5, "refresh_rate_seconds": 30 },
            "acls": config.acls,
        })
        .to_string()
    }

    async fn setup(initial: String) -> (Arc<MemorySource>, Arc<SnapshotStore>, ConfigReloader) {
        let source = MemorySource::new(initial);
        let raw = source.fetch().await.unwrap();
        let config = AppConfig::from_raw(&raw).unwrap();
        let store = Arc::new(SnapshotStore::new(
            GatewaySnapshot::from_config(&config).unwrap(),
        ));
        let reloader = ConfigReloader::new(
            source.clone(),
            store.clone(),
            &config.reload,
            Some(raw),
        );
        (source, store, reloader)
    }

    fn anonymous_allowed(store: &SnapshotStore) -> bool {
        store
            .current()
            .acl()
            .authorize("any/key", &SessionState::Absent)
            .is_allowed()
    }

    #[tokio::test]
    async fn test_unchanged_document_not_rebuilt() {
        let (_source, store, mut reloader) = setup(document(&["anonymous"])).await;
        let before = store.current();
        assert_eq!(reloader.reload_once().await.unwrap(), ReloadOutcome::Unchanged);
        assert!(Arc::ptr_eq(&before, &store.current()));
    }

    #[tokio::test]
    async fn test_changed_document_published() {
        let (source, store, mut reloader) = setup(document(&["anonymous"])).await;
        assert!(anonymous_allowed(&store));

        source.set(document(&[]));
        assert_eq!(reloader.reload_once().await.unwrap(), ReloadOutcome::Applied);
        assert!(!anonymous_allowed(&store));
    }

    #[tokio::test]
    async fn test_invalid_document_keeps_previous() {
        let (source, store, mut reloader) = setup(document(&["anonymous"])).await;
        let before = store.current();

        source.set(r#"{"acls": {"default": ["anonymous"]}}"#.to_string());
        let err = reloader.reload_once().await.unwrap_err();
        assert_eq!(err.message, "signing and encryption keys not set");
        assert!(Arc::ptr_eq(&before, &store.current()));

        // A later valid document is still picked up.
        source.set(document(&[]));
        assert_eq!(reloader.reload_once().await.unwrap(), ReloadOutcome::Applied);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous() {
        let (source, store, mut reloader) = setup(document(&["anonymous"])).await;
        let before = store.current();
        source.fail("bucket unreachable");
        assert!(reloader.reload_once().await.is_err());
        assert!(Arc::ptr_eq(&before, &store.current()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_staleness_tracks_failed_fetches() {
        let (source, _store, mut reloader) = setup(document(&["anonymous"])).await;
        source.fail("bucket unreachable");

        tokio::time::advance(Duration::from_secs(20)).await;
        let _ = reloader.reload_once().await;
        assert!(!reloader.is_stale());

        tokio::time::advance(Duration::from_secs(20)).await;
        let _ = reloader.reload_once().await;
        assert!(reloader.is_stale());

        source.set(document(&["anonymous"]));
        reloader.reload_once().await.unwrap();
        assert!(!reloader.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_staleness_tracks_invalid_documents() {
        let (source, store, mut reloader) = setup(document(&["anonymous"])).await;
        let before = store.current();
        source.set(r#"{"acls": {"default": ["anonymous"]}}"#.to_string());

        tokio::time::advance(Duration::from_secs(20)).await;
        assert!(reloader.reload_once().await.is_err());
        assert!(!reloader.is_stale());

        tokio::time::advance(Duration::from_secs(20)).await;
        assert!(reloader.reload_once().await.is_err());
        assert!(reloader.is_stale());
        assert!(Arc::ptr_eq(&before, &store.current()));

        source.set(document(&[]));
        assert_eq!(reloader.reload_once().await.unwrap(), ReloadOutcome::Applied);
        assert!(!reloader.is_stale());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_polls_and_stops() {
        let (source, store, reloader) = setup(document(&["anonymous"])).await;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut published = store.subscribe();
        let handle = tokio::spawn(reloader.run(shutdown_rx));

        source.set(document(&[]));
        tokio::time::advance(Duration::from_secs(6)).await;
        published.changed().await.expect("snapshot published");
        assert!(!anonymous_allowed(&store));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
