//! Shared test helpers for integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use chrono::Utc;
use http::{Request, Response, header};
use serde_json::Value;
use tower::ServiceExt;

use gatekeeper_auth::Session;
use gatekeeper_core::config::{AclRules, AppConfig, GatewayMode};
use gatekeeper_core::error::AppError;
use gatekeeper_core::result::AppResult;
use gatekeeper_core::traits::{LinkIssuer, SignedLink};
use gatekeeper_service::{AuthFlow, GatewaySnapshot, SnapshotStore};

/// Host every test request addresses.
pub const HOST: &str = "files.example.com";

/// Identity provider login endpoint used by test configs.
pub const AUTH_URL: &str = "https://login.example.com/auth";

/// In-memory stand-in for the object store.
#[derive(Debug, Default)]
pub struct FakeIssuer {
    calls: Mutex<Vec<(String, String)>>,
    fail: AtomicBool,
}

impl FakeIssuer {
    /// Make every subsequent presign fail.
    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    /// `(bucket, key)` pairs presigned so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkIssuer for FakeIssuer {
    fn provider_type(&self) -> &str {
        "fake"
    }

    async fn issue_link(&self, bucket: &str, key: &str) -> AppResult<SignedLink> {
        self.calls
            .lock()
            .unwrap()
            .push((bucket.to_string(), key.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::external_service("failed to load signed url"));
        }
        Ok(SignedLink {
            url: format!(
                "https://objects.example.com/{bucket}/{key}?X-Amz-Expires=60&X-Amz-Signature={}",
                self.calls.lock().unwrap().len()
            ),
            expires_at: Utc::now() + chrono::Duration::seconds(60),
        })
    }
}

/// Deterministic key material for one test configuration.
pub fn keys(seed: u8) -> (String, String) {
    (URL_SAFE.encode([seed; 32]), URL_SAFE.encode([seed.wrapping_add(1); 32]))
}

/// A valid configuration with the given ACLs.
pub fn config_with(acls: &[(&str, &[&str])]) -> AppConfig {
    let (sign_key, enc_key) = keys(7);
    let mut config = AppConfig::default();
    config.session.sign_key = sign_key;
    config.session.enc_key = enc_key;
    config.session.domain = "example.com".to_string();
    config.auth.auth_url = AUTH_URL.to_string();
    config.acls = acls
        .iter()
        .map(|(key, rules)| {
            (
                key.to_string(),
                rules.iter().map(|r| r.to_string()).collect(),
            )
        })
        .collect::<AclRules>();
    config
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Live snapshot store
    pub store: Arc<SnapshotStore>,
    /// Object store stand-in
    pub issuer: Arc<FakeIssuer>,
}

impl TestApp {
    /// Integrated-mode app with the given ACLs.
    pub fn new(acls: &[(&str, &[&str])]) -> Self {
        Self::with_config(config_with(acls))
    }

    /// Authorization-only app with the given ACLs.
    pub fn authorization_only(acls: &[(&str, &[&str])]) -> Self {
        let mut config = config_with(acls);
        config.auth.mode = GatewayMode::AuthorizationOnly;
        Self::with_config(config)
    }

    /// App built from an explicit configuration.
    pub fn with_config(config: AppConfig) -> Self {
        let snapshot = GatewaySnapshot::from_config(&config).expect("valid test config");
        let store = Arc::new(SnapshotStore::new(snapshot));
        let issuer = Arc::new(FakeIssuer::default());
        let flow = Arc::new(AuthFlow::new(store.clone(), issuer.clone()));
        let state = gatekeeper_api::AppState::new(flow);

        Self {
            router: gatekeeper_api::build_app(state),
            store,
            issuer,
        }
    }

    /// Session token for `login` with `group` / `group/subgroup` memberships.
    pub fn token(&self, login: &str, members: &[&str]) -> String {
        let session = Session::from_specs(login, members).expect("valid memberships");
        self.store
            .current()
            .codec()
            .encode(&session)
            .expect("encode session")
    }

    /// Send a GET with an optional session cookie.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri).header(header::HOST, HOST);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("theme=dark; session={token}"));
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }
}

/// `Location` header of a response.
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Parse a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
