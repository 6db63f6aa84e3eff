//! Configuration reload as seen by in-flight and subsequent requests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use http::StatusCode;
use serde_json::json;

use gatekeeper_core::config::{AppConfig, FileConfigSource, ReloadConfig};
use gatekeeper_core::traits::ConfigSource;
use gatekeeper_service::{ConfigReloader, GatewaySnapshot, ReloadOutcome};

use crate::helpers::{AUTH_URL, TestApp, config_with, keys, location};

struct TempConfig {
    path: PathBuf,
}

impl TempConfig {
    fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "gatekeeper-reload-{}-{}.json",
            std::process::id(),
            nanos
        ));
        Self { path }
    }

    async fn write(&self, seed: u8, default_rules: &[&str]) {
        let (sign_key, enc_key) = keys(seed);
        let document = json!({
            "session": {
                "domain": "example.com",
                "sign_key": sign_key,
                "enc_key": enc_key,
            },
            "auth": { "auth_url": AUTH_URL },
            "acls": { "default": default_rules },
        });
        tokio::fs::write(&self.path, document.to_string())
            .await
            .unwrap();
    }

    async fn write_raw(&self, contents: &str) {
        tokio::fs::write(&self.path, contents).await.unwrap();
    }
}

impl Drop for TempConfig {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

async fn app_from_file(file: &TempConfig) -> (TestApp, ConfigReloader) {
    let source: Arc<dyn ConfigSource> = Arc::new(FileConfigSource::new(file.path.clone()));
    let raw = source.fetch().await.unwrap();
    let config = AppConfig::from_raw(&raw).unwrap();
    let app = TestApp::with_config(config);
    let reloader = ConfigReloader::new(
        source,
        app.store.clone(),
        &ReloadConfig::default(),
        Some(raw),
    );
    (app, reloader)
}

#[tokio::test]
async fn test_reload_swaps_acls() {
    let file = TempConfig::new();
    file.write(7, &["anonymous"]).await;
    let (app, mut reloader) = app_from_file(&file).await;
    let token = app.token("octocat", &[]);

    let before = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;
    assert_eq!(before.status(), StatusCode::SEE_OTHER);

    assert_eq!(reloader.reload_once().await.unwrap(), ReloadOutcome::Unchanged);

    file.write(7, &[]).await;
    assert_eq!(reloader.reload_once().await.unwrap(), ReloadOutcome::Applied);

    let after = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;
    assert_eq!(after.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_key_rotation_invalidates_sessions() {
    let file = TempConfig::new();
    file.write(7, &["anonymous"]).await;
    let (app, mut reloader) = app_from_file(&file).await;
    let old_token = app.token("octocat", &[]);

    file.write(42, &["anonymous"]).await;
    reloader.reload_once().await.unwrap();

    let response = app.get("/?bucket=docs&path=readme.md", Some(&old_token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with(AUTH_URL));

    let new_token = app.token("octocat", &[]);
    let response = app.get("/?bucket=docs&path=readme.md", Some(&new_token)).await;
    assert!(location(&response).starts_with("https://objects.example.com/"));
}

#[tokio::test]
async fn test_broken_reload_keeps_serving() {
    let file = TempConfig::new();
    file.write(7, &["anonymous"]).await;
    let (app, mut reloader) = app_from_file(&file).await;
    let token = app.token("octocat", &[]);

    file.write_raw("{ not json").await;
    assert!(reloader.reload_once().await.is_err());

    file.write_raw(r#"{"acls": {"default": ["docs-team/"]}}"#).await;
    assert!(reloader.reload_once().await.is_err());

    let response = app.get("/?bucket=docs&path=readme.md", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("https://objects.example.com/"));
}

#[tokio::test]
async fn test_in_flight_snapshot_is_stable() {
    let app = TestApp::new(&[("default", &["anonymous"])]);
    let held = app.store.current();

    let mut rotated = config_with(&[("default", &[])]);
    let (sign_key, enc_key) = keys(99);
    rotated.session.sign_key = sign_key;
    rotated.session.enc_key = enc_key;
    app.store
        .publish(GatewaySnapshot::from_config(&rotated).unwrap());

    // Held snapshot still decodes its own tokens and applies its own ACLs.
    let token = held
        .codec()
        .encode(&gatekeeper_auth::Session::new("octocat").unwrap())
        .unwrap();
    let state = held.codec().decode(&token);
    assert!(state.is_active());
    assert!(held.acl().authorize("docs/readme.md", &state).is_allowed());

    // The live snapshot rejects both.
    let live = app.store.current();
    assert!(!live.codec().decode(&token).is_active());
}
