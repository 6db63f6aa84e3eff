//! Trait for fetching raw configuration documents.

use async_trait::async_trait;

use crate::config::RawConfig;
use crate::result::AppResult;

/// Something that can produce the current configuration document.
///
/// Implemented for local files in this crate and for objects in the
/// backing store in `gatekeeper-storage`. Called once at startup and then
/// on every reload poll.
#[async_trait]
pub trait ConfigSource: Send + Sync + std::fmt::Debug + 'static {
    /// Human-readable location, used in logs.
    fn location(&self) -> String;

    /// Fetch the current document.
    async fn fetch(&self) -> AppResult<RawConfig>;
}
