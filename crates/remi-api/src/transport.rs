// Shared transport configuration for building reqwest::Client instances.
//
// The Remi app sends a fixed set of Parse headers on every call. They are
// installed once as client default headers; only the session token is
// attached per request.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::error::Error;

pub const DEFAULT_BASE_URL: &str = "https://remi2.urbanhello.com/parse";

pub const CLIENT_VERSION: &str = "i1.16.0";
pub const APPLICATION_ID: &str = "jf1a0bADt5fq";
pub const OS_VERSION: &str = "14.2 (18B92)";
pub const APP_BUILD_VERSION: &str = "13433";
pub const APP_DISPLAY_VERSION: &str = "1.6.9";
pub const USER_AGENT: &str = "Remi/13433 CFNetwork/1206 Darwin/20.1.0";

pub const HEADER_CLIENT_VERSION: &str = "x-parse-client-version";
pub const HEADER_APPLICATION_ID: &str = "x-parse-application-id";
pub const HEADER_INSTALLATION_ID: &str = "x-parse-installation-id";
pub const HEADER_OS_VERSION: &str = "x-parse-os-version";
pub const HEADER_APP_BUILD_VERSION: &str = "x-parse-app-build-version";
pub const HEADER_APP_DISPLAY_VERSION: &str = "x-parse-app-display-version";
pub const HEADER_SESSION_TOKEN: &str = "x-parse-session-token";

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` carrying the fixed Parse header set for
    /// the given installation.
    pub fn build_client(&self, installation_id: &str) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(default_headers(installation_id)?)
            .build()
            .map_err(Error::Transport)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The constant header set sent with every request.
///
/// `Accept-Encoding` is left to reqwest, which advertises exactly the
/// decoders it was built with (gzip, br).
pub fn default_headers(installation_id: &str) -> Result<HeaderMap, Error> {
    let mut headers = HeaderMap::new();
    let fixed = [
        (HEADER_CLIENT_VERSION, CLIENT_VERSION),
        (HEADER_APPLICATION_ID, APPLICATION_ID),
        (HEADER_OS_VERSION, OS_VERSION),
        (HEADER_APP_BUILD_VERSION, APP_BUILD_VERSION),
        (HEADER_APP_DISPLAY_VERSION, APP_DISPLAY_VERSION),
    ];
    for (name, value) in fixed {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers.insert(
        HeaderName::from_static(HEADER_INSTALLATION_ID),
        HeaderValue::from_str(installation_id)?,
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("en-gb"));
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json; charset=utf-8"),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    Ok(headers)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn default_headers_carry_parse_identity() {
        let headers = default_headers("install-1").unwrap();
        assert_eq!(headers[HEADER_APPLICATION_ID], APPLICATION_ID);
        assert_eq!(headers[HEADER_CLIENT_VERSION], CLIENT_VERSION);
        assert_eq!(headers[HEADER_INSTALLATION_ID], "install-1");
        assert_eq!(headers[header::ACCEPT_LANGUAGE], "en-gb");
        assert!(!headers.contains_key(HEADER_SESSION_TOKEN));
    }

    #[test]
    fn non_ascii_installation_id_is_rejected() {
        assert!(default_headers("bad\nid").is_err());
    }
}
