// Remi cloud HTTP client
//
// Wraps `reqwest::Client` with Parse URL construction, session-token
// injection and the one-shot re-login on HTTP 401. Endpoint methods
// (device, events) live in separate files as inherent methods, keeping
// this module focused on transport mechanics.

use std::sync::RwLock;

use reqwest::Method;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{Credentials, Reauth};
use crate::error::Error;
use crate::transport::{HEADER_SESSION_TOKEN, TransportConfig};

/// Stateful client for the Remi Parse Server API.
///
/// Owns the credentials, the current session token and the id of the
/// device every device/event call is scoped to. The token is replaced on
/// each login; the device id is set by `set_remi_id`, or by the first
/// login when none was chosen.
pub struct RemiClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    session_token: RwLock<Option<SecretString>>,
    remi_id: RwLock<Option<String>>,
}

impl RemiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the Parse mount point, e.g.
    /// `https://remi2.urbanhello.com/parse`. Endpoint paths are appended
    /// to it verbatim.
    pub fn new(
        base_url: Url,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client(&credentials.installation_id)?;
        Ok(Self {
            http,
            base_url,
            credentials,
            session_token: RwLock::new(None),
            remi_id: RwLock::new(None),
        })
    }

    /// The Parse base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The login material this client was built with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The underlying HTTP client (for the login flow).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── Session state ────────────────────────────────────────────────

    /// The device all device/event calls are scoped to.
    pub fn remi_id(&self) -> Option<String> {
        self.remi_id.read().expect("remi id lock poisoned").clone()
    }

    /// Select the device to operate on.
    pub fn set_remi_id(&self, remi_id: impl Into<String>) {
        *self.remi_id.write().expect("remi id lock poisoned") = Some(remi_id.into());
    }

    /// The current session token, if logged in.
    pub fn session_token(&self) -> Option<SecretString> {
        self.session_token
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// Reuse a persisted session without logging in. A stale token is
    /// fine: the first 401 triggers a fresh login.
    pub fn restore_session(&self, session_token: SecretString, remi_id: impl Into<String>) {
        self.set_session_token(session_token);
        self.set_remi_id(remi_id);
    }

    pub(crate) fn set_session_token(&self, token: SecretString) {
        debug!("storing session token");
        *self.session_token.write().expect("session lock poisoned") = Some(token);
    }

    /// The selected device id, or an API error when none is set.
    pub(crate) fn require_remi_id(&self) -> Result<String, Error> {
        self.remi_id().ok_or_else(|| Error::Api {
            status: None,
            message: "no Remi device selected (log in first)".into(),
        })
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL: `{base}/{path}`.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Attach the session token header, if we have one.
    fn apply_session(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let guard = self.session_token.read().expect("session lock poisoned");
        match guard.as_ref() {
            Some(token) => {
                let mut value = HeaderValue::from_str(token.expose_secret())?;
                value.set_sensitive(true);
                Ok(builder.header(HEADER_SESSION_TOKEN, value))
            }
            None => Ok(builder),
        }
    }

    // ── Request dispatch ─────────────────────────────────────────────

    /// Send an authenticated request and decode the JSON response.
    ///
    /// On HTTP 401 with `Reauth::Allowed`, logs in once and resends the
    /// request with `Reauth::Denied`. A 401 on that retry is an
    /// `Error::Api`, like any other non-success status.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        reauth: Reauth,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        let mut reauth = reauth;

        loop {
            debug!("{} {}", method, url);

            let mut builder = self.http.request(method.clone(), url.clone());
            if let Some(body) = body {
                builder = builder.body(body.to_string());
            }
            let builder = self.apply_session(builder)?;
            let resp = builder.send().await.map_err(Error::Transport)?;

            if resp.status() == reqwest::StatusCode::UNAUTHORIZED && reauth == Reauth::Allowed {
                debug!("session expired, re-authenticating");
                self.login().await?;
                reauth = Reauth::Denied;
                continue;
            }

            return handle_response(resp, path).await;
        }
    }
}

/// Treat 200 and 201 as success and decode the body; everything else
/// becomes `Error::Api` with the status and a body preview.
pub(crate) async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
    path: &str,
) -> Result<T, Error> {
    let status = resp.status();

    if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: Some(status.as_u16()),
            message: format!("{path}: {}", preview(&body)),
        });
    }

    let body = resp.text().await.map_err(Error::Transport)?;
    trace!(bytes = body.len(), "response body received");

    let text = if body.trim().is_empty() { "null" } else { &body };
    serde_json::from_str(text).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body: body.clone(),
    })
}

/// First 200 characters of a body, cut on a char boundary.
pub(crate) fn preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
