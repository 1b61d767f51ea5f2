// ── Runtime coordinator configuration ──
//
// Describes *how* to reach the Remi cloud and which device to poll.
// Carries credential data and polling tuning but never touches disk;
// the CLI builds a `CoordinatorConfig` from a profile and hands it in.

use std::time::Duration;

use remi_api::{Credentials, DEFAULT_BASE_URL};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Default poll interval, in seconds.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;

/// Configuration for polling a single device.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Parse mount point (e.g. `https://remi2.urbanhello.com/parse`).
    pub base_url: Url,
    pub credentials: Credentials,
    /// Device to poll. When unset, `start()` logs in and uses the
    /// account's current device.
    pub remi_id: Option<String>,
    /// Persisted session token, reused until the server rejects it.
    pub session_token: Option<SecretString>,
    /// Request timeout.
    pub timeout: Duration,
    /// Poll interval. Zero disables the background refresh task.
    pub scan_interval: Duration,
}

impl CoordinatorConfig {
    /// Config for the production cloud with default tuning.
    pub fn new(credentials: Credentials) -> Result<Self, CoreError> {
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
            message: format!("invalid default base URL: {e}"),
        })?;
        Ok(Self {
            base_url,
            credentials,
            remi_id: None,
            session_token: None,
            timeout: Duration::from_secs(30),
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS),
        })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_remi_id(mut self, remi_id: impl Into<String>) -> Self {
        self.remi_id = Some(remi_id.into());
        self
    }

    pub fn with_session_token(mut self, token: SecretString) -> Self {
        self.session_token = Some(token);
        self
    }

    pub fn with_scan_interval(mut self, interval: Duration) -> Self {
        self.scan_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
