// Session login
//
// Parse authenticates with GET semantics tunnelled through POST: the
// JSON body carries `"_method":"GET"` next to the credentials. The
// session token from the response is stored on the client and sent as
// `X-Parse-Session-Token` from then on.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info};

use crate::auth::Session;
use crate::client::{RemiClient, handle_response, preview};
use crate::error::Error;
use crate::models::LoginResponse;

impl RemiClient {
    /// Authenticate with the configured username/password.
    ///
    /// The request is sent without a session token. On success the token
    /// is stored on the client. The account's current device id is stored
    /// only when no device is selected yet, so a silent re-login keeps an
    /// explicitly chosen device. When the server returns no device list,
    /// the current device alone is reported.
    pub async fn login(&self) -> Result<Session, Error> {
        let url = self.url("login")?;
        debug!("logging in at {}", url);

        let creds = self.credentials();
        let body = json!({
            "_method": "GET",
            "username": creds.username,
            "password": creds.password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .body(body.to_string())
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "invalid username or password".into(),
            });
        }
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: Some(status.as_u16()),
                message: format!("login failed: {}", preview(&body)),
            });
        }

        let login: LoginResponse = handle_response(resp, "login").await?;
        let session = session_from_login(&login)?;

        self.set_session_token(session.session_token.clone());
        if self.remi_id().is_none() {
            self.set_remi_id(session.remi_id.clone());
        }

        info!(
            remi_id = %session.remi_id,
            devices = session.remi_ids.len(),
            "login successful"
        );
        Ok(session)
    }
}

/// Validate a decoded login response. Never returns partial state.
fn session_from_login(login: &LoginResponse) -> Result<Session, Error> {
    let token = login
        .session_token
        .as_deref()
        .filter(|t| !t.is_empty());

    let (Some(token), Some(remi_id)) = (token, login.current_remi_id()) else {
        return Err(Error::Authentication {
            message: "login response missing sessionToken or currentRemi".into(),
        });
    };

    let mut remi_ids: Vec<String> = login
        .remis
        .iter()
        .map(|r| r.id().to_owned())
        .filter(|id| !id.is_empty())
        .collect();
    if remi_ids.is_empty() {
        remi_ids.push(remi_id.to_owned());
    }

    Ok(Session {
        session_token: SecretString::from(token.to_owned()),
        remi_id: remi_id.to_owned(),
        remi_ids,
    })
}
