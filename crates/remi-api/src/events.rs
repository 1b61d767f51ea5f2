// Alarm (`Event` class) endpoints.

use reqwest::Method;
use serde_json::{Map, Value, json};

use crate::auth::Reauth;
use crate::client::RemiClient;
use crate::error::Error;
use crate::models::{CreatedObject, Event, Pointer, QueryResults, UpdateResponse};

impl RemiClient {
    /// List every alarm whose `remi` pointer matches the selected device.
    ///
    /// No alarms is an empty list, not an error.
    pub async fn get_events(&self) -> Result<Vec<Event>, Error> {
        let remi_id = self.require_remi_id()?;
        let body = json!({
            "where": { "remi": Pointer::remi(remi_id) },
            "_method": "GET",
        });

        let page: QueryResults<Event> = self
            .request(Method::POST, "classes/Event", Some(&body), Reauth::Allowed)
            .await?;
        Ok(page.results)
    }

    /// Create an alarm. A `remi` pointer to the selected device is always
    /// injected, replacing any caller-supplied one.
    pub async fn create_event(&self, mut fields: Map<String, Value>) -> Result<CreatedObject, Error> {
        let remi_id = self.require_remi_id()?;
        fields.insert("remi".into(), json!(Pointer::remi(remi_id)));

        self.request(
            Method::POST,
            "classes/Event",
            Some(&Value::Object(fields)),
            Reauth::Allowed,
        )
        .await
    }

    /// Partially update an alarm.
    pub async fn update_event(&self, event_id: &str, fields: &Value) -> Result<UpdateResponse, Error> {
        self.request(
            Method::PUT,
            &format!("classes/Event/{event_id}"),
            Some(fields),
            Reauth::Allowed,
        )
        .await
    }

    /// Delete an alarm. The response body is ignored.
    pub async fn delete_event(&self, event_id: &str) -> Result<(), Error> {
        let _: Value = self
            .request(
                Method::DELETE,
                &format!("classes/Event/{event_id}"),
                None,
                Reauth::Allowed,
            )
            .await?;
        Ok(())
    }
}
