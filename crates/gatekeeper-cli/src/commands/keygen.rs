//! Key generation.

use serde::Serialize;
use tabled::Tabled;

use gatekeeper_auth::SessionKeys;
use gatekeeper_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Freshly generated key pair, base64url encoded.
#[derive(Debug, Serialize, Tabled)]
struct GeneratedKeys {
    sign_key: String,
    enc_key: String,
}

/// Print a new signing/encryption key pair.
pub fn execute(format: OutputFormat) -> Result<(), AppError> {
    let (sign_key, enc_key) = SessionKeys::generate();
    let keys = GeneratedKeys { sign_key, enc_key };

    match format {
        OutputFormat::Table => {
            output::print_kv("session.sign_key", &keys.sign_key);
            output::print_kv("session.enc_key", &keys.enc_key);
        }
        OutputFormat::Json => output::print_record(&keys, format),
    }
    Ok(())
}
