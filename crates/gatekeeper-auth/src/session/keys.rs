//! Signing and encryption key material for session tokens.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm, KeyInit, Nonce};
use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE};
use base64::engine::DecodePaddingMode;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;

use gatekeeper_core::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Minimum decoded signing key length in bytes.
pub const MIN_SIGN_KEY_LEN: usize = 32;

/// Length of a generated encryption key (AES-256).
pub const GENERATED_ENC_KEY_LEN: usize = 32;

/// Length of a generated signing key.
pub const GENERATED_SIGN_KEY_LEN: usize = 64;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// HMAC-SHA256 output length in bytes.
pub const MAC_LEN: usize = 32;

/// Base64url that accepts keys written with or without `=` padding.
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// AES-GCM variant chosen by the encryption key length.
#[derive(Clone)]
enum SessionCipher {
    Aes128(Aes128Gcm),
    Aes256(Aes256Gcm),
}

/// Decoded, length-checked key material.
#[derive(Clone)]
pub struct SessionKeys {
    sign_key: Vec<u8>,
    cipher: SessionCipher,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cipher = match self.cipher {
            SessionCipher::Aes128(_) => "aes-128-gcm",
            SessionCipher::Aes256(_) => "aes-256-gcm",
        };
        f.debug_struct("SessionKeys")
            .field("sign_key_len", &self.sign_key.len())
            .field("cipher", &cipher)
            .finish()
    }
}

impl SessionKeys {
    /// Decodes base64url keys as they appear in configuration.
    pub fn from_base64(sign_key: &str, enc_key: &str) -> Result<Self, AppError> {
        let sign = KEY_ENGINE
            .decode(sign_key.trim())
            .map_err(|e| AppError::configuration(format!("signing key is not base64url: {e}")))?;
        let enc = KEY_ENGINE
            .decode(enc_key.trim())
            .map_err(|e| AppError::configuration(format!("encryption key is not base64url: {e}")))?;
        Self::from_bytes(&sign, &enc)
    }

    /// Builds keys from raw bytes, enforcing lengths.
    pub fn from_bytes(sign_key: &[u8], enc_key: &[u8]) -> Result<Self, AppError> {
        if sign_key.len() < MIN_SIGN_KEY_LEN {
            return Err(AppError::configuration(format!(
                "signing key must be at least {MIN_SIGN_KEY_LEN} bytes, got {}",
                sign_key.len()
            )));
        }

        let cipher = match enc_key.len() {
            16 => SessionCipher::Aes128(
                Aes128Gcm::new_from_slice(enc_key)
                    .map_err(|_| AppError::configuration("invalid AES-128 key"))?,
            ),
            32 => SessionCipher::Aes256(
                Aes256Gcm::new_from_slice(enc_key)
                    .map_err(|_| AppError::configuration("invalid AES-256 key"))?,
            ),
            other => {
                return Err(AppError::configuration(format!(
                    "encryption key must be 16 or 32 bytes, got {other}"
                )));
            }
        };

        Ok(Self {
            sign_key: sign_key.to_vec(),
            cipher,
        })
    }

    /// Generates a fresh `(sign_key, enc_key)` pair, base64url-encoded.
    pub fn generate() -> (String, String) {
        let mut sign = vec![0u8; GENERATED_SIGN_KEY_LEN];
        let mut enc = vec![0u8; GENERATED_ENC_KEY_LEN];
        OsRng.fill_bytes(&mut sign);
        OsRng.fill_bytes(&mut enc);
        (URL_SAFE.encode(sign), URL_SAFE.encode(enc))
    }

    /// HMAC-SHA256 over `context || 0x00 || message`.
    pub(crate) fn sign(&self, context: &[u8], message: &[u8]) -> Result<[u8; MAC_LEN], AppError> {
        let mac = self.mac(context, message)?;
        let mut out = [0u8; MAC_LEN];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(out)
    }

    /// Constant-time verification of [`SessionKeys::sign`] output.
    pub(crate) fn verify(&self, context: &[u8], message: &[u8], tag: &[u8]) -> bool {
        match self.mac(context, message) {
            Ok(mac) => mac.verify_slice(tag).is_ok(),
            Err(_) => false,
        }
    }

    fn mac(&self, context: &[u8], message: &[u8]) -> Result<HmacSha256, AppError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.sign_key)
            .map_err(|_| AppError::internal("HMAC key rejected"))?;
        mac.update(context);
        mac.update(&[0]);
        mac.update(message);
        Ok(mac)
    }

    /// Encrypts `plaintext` with a fresh nonce; returns `nonce || ciphertext`.
    pub(crate) fn seal(&self, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, AppError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);
        let payload = Payload {
            msg: plaintext,
            aad,
        };

        let ciphertext = match &self.cipher {
            SessionCipher::Aes128(cipher) => cipher.encrypt(nonce, payload),
            SessionCipher::Aes256(cipher) => cipher.encrypt(nonce, payload),
        }
        .map_err(|_| AppError::internal("session encryption failed"))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Reverses [`SessionKeys::seal`]. `None` on truncation or auth failure.
    pub(crate) fn open(&self, aad: &[u8], sealed: &[u8]) -> Option<Vec<u8>> {
        if sealed.len() < NONCE_LEN {
            return None;
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);
        let payload = Payload {
            msg: ciphertext,
            aad,
        };

        match &self.cipher {
            SessionCipher::Aes128(cipher) => cipher.decrypt(nonce, payload).ok(),
            SessionCipher::Aes256(cipher) => cipher.decrypt(nonce, payload).ok(),
        }
    }
}
