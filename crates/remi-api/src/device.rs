// Device, face catalog and server config endpoints.

use reqwest::Method;
use serde_json::{Value, json};

use crate::auth::Reauth;
use crate::client::RemiClient;
use crate::error::Error;
use crate::models::{Face, QueryResults, Remi, ServerConfig, UpdateResponse};

impl RemiClient {
    /// Fetch the selected device record.
    ///
    /// `POST classes/Remi` with `limit: "1"` and an `objectId` filter.
    /// An empty result set is an `Error::Api`.
    pub async fn get_remi(&self) -> Result<Remi, Error> {
        let remi_id = self.require_remi_id()?;
        let body = json!({
            "limit": "1",
            "where": { "objectId": remi_id },
            "_method": "GET",
        });

        let page: QueryResults<Remi> = self
            .request(Method::POST, "classes/Remi", Some(&body), Reauth::Allowed)
            .await?;

        page.results.into_iter().next().ok_or_else(|| Error::Api {
            status: None,
            message: format!("Remi device {remi_id} not found"),
        })
    }

    /// Partially update the selected device (`PUT classes/Remi/{id}`).
    ///
    /// `fields` is sent as-is; the server echoes `updatedAt` and the
    /// changed fields.
    pub async fn update_remi(&self, fields: &Value) -> Result<UpdateResponse, Error> {
        let remi_id = self.require_remi_id()?;
        self.request(
            Method::PUT,
            &format!("classes/Remi/{remi_id}"),
            Some(fields),
            Reauth::Allowed,
        )
        .await
    }

    /// List the face catalog ordered by `index`.
    pub async fn get_faces(&self) -> Result<Vec<Face>, Error> {
        let body = json!({ "order": "index", "_method": "GET" });
        let page: QueryResults<Face> = self
            .request(Method::POST, "classes/Face", Some(&body), Reauth::Allowed)
            .await?;
        Ok(page.results)
    }

    /// Fetch server-wide config (`GET config`).
    pub async fn get_config(&self) -> Result<ServerConfig, Error> {
        self.request(Method::GET, "config", None, Reauth::Allowed)
            .await
    }
}
