// ── Core error types ──
//
// User-facing errors from remi-core. Consumers never see raw HTTP
// responses or JSON parse failures; `From<remi_api::Error>` translates
// transport-layer errors into domain variants. `Clone` so one poll
// result can be handed to every caller waiting on the same cycle.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to the Remi cloud at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request to the Remi cloud timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// No poll has succeeded yet, so there is nothing to act on.
    #[error("No device data available yet")]
    NotReady,

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

/// How an interactive login failure should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SetupFailure {
    InvalidAuth,
    CannotConnect,
    Unknown,
}

impl CoreError {
    /// Classify an error raised while setting up a new device profile.
    pub fn setup_failure(&self) -> SetupFailure {
        match self {
            Self::AuthenticationFailed { .. } => SetupFailure::InvalidAuth,
            Self::ConnectionFailed { .. }
            | Self::Timeout
            | Self::Api { .. }
            | Self::NotFound { .. } => SetupFailure::CannotConnect,
            _ => SetupFailure::Unknown,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<remi_api::Error> for CoreError {
    fn from(err: remi_api::Error) -> Self {
        if err.is_not_found() {
            return CoreError::NotFound {
                message: err.to_string(),
            };
        }
        match err {
            remi_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            remi_api::Error::Api { message, status } => CoreError::Api { message, status },
            remi_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            remi_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            remi_api::Error::InvalidHeader(e) => CoreError::Config {
                message: format!("Invalid header value: {e}"),
            },
            remi_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
