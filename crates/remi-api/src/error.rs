use thiserror::Error;

/// Top-level error type for the `remi-api` crate.
///
/// Two kinds matter to callers: `Authentication` (bad credentials or a
/// malformed login payload) and `Api` (every other HTTP-level or
/// application-level failure). The remaining variants are plumbing.
/// `remi-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, or the login response was missing a session token
    /// or a primary device reference.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status, or an empty result set where one record
    /// was required. The status and a preview of the body are kept.
    #[error("API error{}: {message}", http_suffix(.status))]
    Api {
        status: Option<u16>,
        message: String,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header value could not be encoded (e.g. a non-ASCII token).
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the server rejected our credentials or session.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Api {
                status: Some(404), ..
            } => true,
            Self::Api {
                status: None,
                message,
            } => message.contains("not found"),
            _ => false,
        }
    }
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn http_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" (HTTP {code})")).unwrap_or_default()
}
