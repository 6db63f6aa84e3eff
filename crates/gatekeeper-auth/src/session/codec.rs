//! Session token encoding and verification.
//!
//! Token layout, base64url without padding:
//!
//! ```text
//! version (1) | nonce (12) | AES-GCM( payload_json | hmac_sha256 (32) )
//! ```
//!
//! The HMAC is keyed with the signing key over `cookie_name || 0x00 ||
//! payload_json`; the cookie name is also the AES-GCM associated data, so a
//! token minted for one cookie never verifies under another.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use gatekeeper_core::config::SessionConfig;
use gatekeeper_core::error::AppError;

use super::keys::{MAC_LEN, SessionKeys};
use super::model::{Memberships, Session, SessionState};

/// Current token format version.
const TOKEN_VERSION: u8 = 1;

/// Tolerated clock skew for tokens issued "in the future".
const MAX_CLOCK_SKEW_SECONDS: i64 = 60;

/// Claims carried inside the encrypted token.
#[derive(Debug, Serialize, Deserialize)]
struct TokenPayload {
    login: String,
    #[serde(default)]
    memberships: Memberships,
    /// Issued-at timestamp (seconds since epoch).
    iat: i64,
    domain: String,
}

/// Why a token was demoted to [`SessionState::Absent`]. Logged, never returned.
#[derive(Debug, Error, PartialEq, Eq)]
enum DecodeFailure {
    #[error("token is not base64url")]
    Encoding,
    #[error("unsupported token version")]
    Version,
    #[error("token truncated")]
    Truncated,
    #[error("decryption failed")]
    Decryption,
    #[error("signature mismatch")]
    Signature,
    #[error("malformed payload")]
    Payload,
    #[error("token bound to another domain")]
    Domain,
    #[error("token issued in the future")]
    NotYetValid,
    #[error("token expired")]
    Expired,
    #[error("token has empty login")]
    EmptyLogin,
}

/// Encodes sessions into opaque tokens and decodes them back.
#[derive(Debug, Clone)]
pub struct SessionCodec {
    keys: SessionKeys,
    cookie_name: String,
    domain: String,
    lifetime: Duration,
}

impl SessionCodec {
    /// Creates a codec from already-decoded keys.
    pub fn new(
        keys: SessionKeys,
        cookie_name: impl Into<String>,
        domain: impl Into<String>,
        lifetime_seconds: u64,
    ) -> Self {
        let lifetime_seconds = i64::try_from(lifetime_seconds).unwrap_or(i64::MAX);
        Self {
            keys,
            cookie_name: cookie_name.into(),
            domain: domain.into(),
            lifetime: Duration::try_seconds(lifetime_seconds).unwrap_or(Duration::MAX),
        }
    }

    /// Creates a codec from the session configuration section.
    pub fn from_config(config: &SessionConfig) -> Result<Self, AppError> {
        let keys = SessionKeys::from_base64(&config.sign_key, &config.enc_key)?;
        Ok(Self::new(
            keys,
            config.cookie_name.clone(),
            config.domain.clone(),
            config.lifetime,
        ))
    }

    /// Name of the cookie carrying the token.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Cookie domain tokens are bound to.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Session lifetime in seconds.
    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// `Set-Cookie` value carrying `token`, scoped to the configured domain.
    pub fn cookie(&self, token: &str) -> String {
        let mut value = format!(
            "{}={}; Path=/; Max-Age={}; Secure; HttpOnly; SameSite=Lax",
            self.cookie_name,
            token,
            self.lifetime.num_seconds()
        );
        if !self.domain.is_empty() {
            value.push_str("; Domain=");
            value.push_str(&self.domain);
        }
        value
    }

    /// Encodes `session` issued now.
    pub fn encode(&self, session: &Session) -> Result<String, AppError> {
        self.encode_at(session, Utc::now())
    }

    /// Encodes `session` as if issued at `issued_at`.
    pub fn encode_at(&self, session: &Session, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let payload = TokenPayload {
            login: session.login().to_string(),
            memberships: session.memberships().clone(),
            iat: issued_at.timestamp(),
            domain: self.domain.clone(),
        };
        let mut signed = serde_json::to_vec(&payload)?;
        let tag = self.keys.sign(self.cookie_name.as_bytes(), &signed)?;
        signed.extend_from_slice(&tag);

        let sealed = self.keys.seal(self.cookie_name.as_bytes(), &signed)?;

        let mut token = Vec::with_capacity(1 + sealed.len());
        token.push(TOKEN_VERSION);
        token.extend_from_slice(&sealed);
        Ok(URL_SAFE_NO_PAD.encode(token))
    }

    /// Decodes a token presented now.
    pub fn decode(&self, token: &str) -> SessionState {
        self.decode_at(token, Utc::now())
    }

    /// Decodes a token as if presented at `now`.
    ///
    /// Any failure yields [`SessionState::Absent`].
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> SessionState {
        match self.try_decode(token, now) {
            Ok(session) => SessionState::Active(session),
            Err(reason) => {
                tracing::debug!(%reason, "Session token rejected");
                SessionState::Absent
            }
        }
    }

    /// Decodes an optional token; a missing token is simply absent.
    pub fn decode_optional(&self, token: Option<&str>) -> SessionState {
        match token {
            Some(token) if !token.is_empty() => self.decode(token),
            _ => SessionState::Absent,
        }
    }

    fn try_decode(&self, token: &str, now: DateTime<Utc>) -> Result<Session, DecodeFailure> {
        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| DecodeFailure::Encoding)?;

        let (version, sealed) = raw.split_first().ok_or(DecodeFailure::Truncated)?;
        if *version != TOKEN_VERSION {
            return Err(DecodeFailure::Version);
        }

        let signed = self
            .keys
            .open(self.cookie_name.as_bytes(), sealed)
            .ok_or(DecodeFailure::Decryption)?;
        if signed.len() < MAC_LEN {
            return Err(DecodeFailure::Truncated);
        }

        let (payload, tag) = signed.split_at(signed.len() - MAC_LEN);
        if !self.keys.verify(self.cookie_name.as_bytes(), payload, tag) {
            return Err(DecodeFailure::Signature);
        }

        let payload: TokenPayload =
            serde_json::from_slice(payload).map_err(|_| DecodeFailure::Payload)?;

        if payload.domain != self.domain {
            return Err(DecodeFailure::Domain);
        }

        let age = now.timestamp().saturating_sub(payload.iat);
        if age < -MAX_CLOCK_SKEW_SECONDS {
            return Err(DecodeFailure::NotYetValid);
        }
        if age > self.lifetime.num_seconds() {
            return Err(DecodeFailure::Expired);
        }

        if payload.login.trim().is_empty() {
            return Err(DecodeFailure::EmptyLogin);
        }

        Ok(Session::from_parts(payload.login, payload.memberships))
    }
}
