// Credentials and session identity for the Remi cloud.
//
// The Parse backend authenticates a username/password pair and hands
// back an opaque session token. Every request also carries a per-install
// UUID that the vendor app generates once and never rotates.

use secrecy::SecretString;
use uuid::Uuid;

/// Whether a request may perform one transparent re-login on HTTP 401.
///
/// The first attempt is sent with `Allowed`; the retry after a fresh
/// login is sent with `Denied`, so a persistently invalid session
/// surfaces as an API error instead of looping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reauth {
    Allowed,
    Denied,
}

/// Immutable login material for a single client instance.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    /// Stable client-instance identifier, sent as `X-Parse-Installation-Id`.
    pub installation_id: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: SecretString,
        installation_id: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password,
            installation_id: installation_id.into(),
        }
    }

    /// Credentials with a freshly generated installation identifier.
    pub fn with_new_installation(username: impl Into<String>, password: SecretString) -> Self {
        Self::new(username, password, new_installation_id())
    }
}

/// Generate a new per-install identifier (UUID v4, hyphenated).
pub fn new_installation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub session_token: SecretString,
    /// Device the account currently points at (`currentRemi`).
    pub remi_id: String,
    /// All devices on the account. Never empty: falls back to `[remi_id]`.
    pub remi_ids: Vec<String>,
}
