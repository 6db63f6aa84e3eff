//! Configuration reload cadence.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Controls how often configuration is re-fetched and how old it may get.
///
/// The two intervals are independent: `poll_interval_seconds` is how often
/// the source is polled, `refresh_rate_seconds` is how long the gateway may
/// keep serving from a snapshot without a successful refresh before it
/// starts warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReloadConfig {
    /// Poll frequency in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Acceptable staleness in seconds.
    #[serde(default = "default_refresh_rate", alias = "refreshrate")]
    pub refresh_rate_seconds: u64,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            refresh_rate_seconds: default_refresh_rate(),
        }
    }
}

impl ReloadConfig {
    /// Poll frequency as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Staleness tolerance as a [`Duration`].
    pub fn refresh_rate(&self) -> Duration {
        Duration::from_secs(self.refresh_rate_seconds)
    }
}

fn default_poll_interval() -> u64 {
    60
}

fn default_refresh_rate() -> u64 {
    900
}
