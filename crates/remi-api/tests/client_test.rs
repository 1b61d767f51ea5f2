#![allow(clippy::unwrap_used)]
// Integration tests for `RemiClient` using wiremock.

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, json};
use url::Url;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use remi_api::{Credentials, Error, Reauth, RemiClient, TransportConfig};

const REMI_ID: &str = "remi_object_id_1";
const TOKEN: &str = "mock_session_token";
const INSTALLATION_ID: &str = "mock-installation-uuid";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RemiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/parse", server.uri())).unwrap();
    let creds = Credentials::new(
        "test@example.com",
        SecretString::from("test_password".to_owned()),
        INSTALLATION_ID,
    );
    let client = RemiClient::new(base_url, creds, &TransportConfig::default()).unwrap();
    (server, client)
}

async fn logged_in() -> (MockServer, RemiClient) {
    let (server, client) = setup().await;
    client.restore_session(SecretString::from(TOKEN.to_owned()), REMI_ID);
    (server, client)
}

fn login_body() -> serde_json::Value {
    json!({
        "sessionToken": TOKEN,
        "currentRemi": { "objectId": REMI_ID },
        "remis": [REMI_ID],
    })
}

fn remi_body() -> serde_json::Value {
    json!({
        "objectId": REMI_ID,
        "name": "Remi Bedroom",
        "online": true,
        "temp": 157,
        "current_firmware_version": 100,
        "face": { "__type": "Pointer", "className": "Face", "objectId": "fIjF0yWRxX" },
        "background_color": [255, 128, 0],
    })
}

// ── Login tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_stores_session() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .and(header("x-parse-application-id", "jf1a0bADt5fq"))
        .and(header("x-parse-installation-id", INSTALLATION_ID))
        .and(body_partial_json(json!({
            "_method": "GET",
            "username": "test@example.com",
            "password": "test_password",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(1)
        .mount(&server)
        .await;

    let session = client.login().await.unwrap();

    assert_eq!(session.session_token.expose_secret(), TOKEN);
    assert_eq!(session.remi_id, REMI_ID);
    assert_eq!(session.remi_ids, vec![REMI_ID.to_owned()]);
    assert_eq!(client.remi_id().as_deref(), Some(REMI_ID));
    assert_eq!(client.session_token().unwrap().expose_secret(), TOKEN);
}

#[tokio::test]
async fn test_login_is_sent_without_session_token() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .mount(&server)
        .await;

    client.login().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("x-parse-session-token"));
}

#[tokio::test]
async fn test_login_multiple_devices() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionToken": TOKEN,
            "currentRemi": { "objectId": REMI_ID },
            "remis": [REMI_ID, "remi_id_2"],
        })))
        .mount(&server)
        .await;

    let session = client.login().await.unwrap();
    assert_eq!(session.remi_ids, vec![REMI_ID.to_owned(), "remi_id_2".to_owned()]);
}

#[tokio::test]
async fn test_login_null_device_list_falls_back_to_current() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionToken": TOKEN,
            "currentRemi": { "objectId": REMI_ID },
            "remis": null,
        })))
        .mount(&server)
        .await;

    let session = client.login().await.unwrap();
    assert_eq!(session.remi_ids, vec![REMI_ID.to_owned()]);
    assert_eq!(client.remi_id().as_deref(), Some(REMI_ID));
}

#[tokio::test]
async fn test_login_unauthorized() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid"})))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(client.session_token().is_none());
}

#[tokio::test]
async fn test_login_server_error_is_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(
        matches!(result, Err(Error::Api { status: Some(500), .. })),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_login_missing_current_remi() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sessionToken": TOKEN})))
        .mount(&server)
        .await;

    let result = client.login().await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
    assert!(client.session_token().is_none());
    assert!(client.remi_id().is_none());
}

// ── Re-authentication tests ─────────────────────────────────────────

#[tokio::test]
async fn test_401_triggers_single_relogin_and_retry() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Remi"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parse/classes/Remi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [remi_body()]})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(1)
        .mount(&server)
        .await;

    let remi = client.get_remi().await.unwrap();
    assert_eq!(remi.object_id, REMI_ID);
}

#[tokio::test]
async fn test_relogin_keeps_selected_device() {
    let (server, client) = setup().await;
    client.restore_session(SecretString::from("stale".to_owned()), "remi_id_2");

    Mock::given(method("POST"))
        .and(path("/parse/classes/Remi"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parse/classes/Remi"))
        .and(body_partial_json(json!({ "where": { "objectId": "remi_id_2" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{
            "objectId": "remi_id_2",
            "name": "Nursery",
        }]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(1)
        .mount(&server)
        .await;

    let remi = client.get_remi().await.unwrap();
    assert_eq!(remi.object_id, "remi_id_2");
    assert_eq!(client.remi_id().as_deref(), Some("remi_id_2"));
    assert_eq!(client.session_token().unwrap().expose_secret(), TOKEN);
}

#[tokio::test]
async fn test_second_401_is_api_error() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Remi"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.get_remi().await;
    assert!(
        matches!(result, Err(Error::Api { status: Some(401), .. })),
        "expected Api error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_reauth_denied_does_not_login() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/parse/config"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parse/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(login_body()))
        .expect(0)
        .mount(&server)
        .await;

    let result: Result<serde_json::Value, _> = client
        .request(reqwest::Method::GET, "config", None, Reauth::Denied)
        .await;
    assert!(matches!(result, Err(Error::Api { status: Some(401), .. })));
}

// ── Device tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_remi_sends_query_and_session() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Remi"))
        .and(header("x-parse-session-token", TOKEN))
        .and(body_partial_json(json!({
            "limit": "1",
            "where": { "objectId": REMI_ID },
            "_method": "GET",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [remi_body()]})))
        .mount(&server)
        .await;

    let remi = client.get_remi().await.unwrap();
    assert_eq!(remi.name.as_deref(), Some("Remi Bedroom"));
    assert_eq!(remi.temp, Some(157));
    assert_eq!(remi.background_color, Some([255, 128, 0]));
}

#[tokio::test]
async fn test_get_remi_empty_results() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Remi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let err = client.get_remi().await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
}

#[tokio::test]
async fn test_get_remi_without_device_selected() {
    let (_server, client) = setup().await;
    let result = client.get_remi().await;
    assert!(matches!(result, Err(Error::Api { status: None, .. })));
}

#[tokio::test]
async fn test_update_remi_puts_fields() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path(format!("/parse/classes/Remi/{REMI_ID}")))
        .and(body_partial_json(json!({"volume": 30})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"updatedAt": "2024-06-15T10:30:00.000Z", "volume": 30})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = client.update_remi(&json!({"volume": 30})).await.unwrap();
    assert!(resp.updated_at.is_some());
    assert_eq!(resp.fields.get("volume"), Some(&json!(30)));
}

#[tokio::test]
async fn test_get_faces_and_config() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Face"))
        .and(body_partial_json(json!({"order": "index", "_method": "GET"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [
            {"objectId": "GDaZOVdRqj", "define": "FACE_OFF", "index": 0},
            {"objectId": "fIjF0yWRxX", "define": "FACE_DAY", "index": 1},
        ]})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/parse/config"))
        .and(header_exists("x-parse-client-version"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"params": {"default_firmware_update_version": 110}})),
        )
        .mount(&server)
        .await;

    let faces = client.get_faces().await.unwrap();
    assert_eq!(faces.len(), 2);
    assert_eq!(faces[1].define.as_deref(), Some("FACE_DAY"));

    let config = client.get_config().await.unwrap();
    assert_eq!(config.latest_firmware_version(), Some(110));
}

#[tokio::test]
async fn test_server_error_preserves_status_and_body() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Face"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client.get_faces().await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, Some(503));
            assert!(message.contains("maintenance"), "message was: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Event tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_events_filters_by_device_pointer() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Event"))
        .and(body_partial_json(json!({
            "where": { "remi": { "__type": "Pointer", "className": "Remi", "objectId": REMI_ID } },
            "_method": "GET",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{
            "objectId": "event_id_1",
            "name": "Morning Alarm",
            "enabled": true,
            "event_time": [7, 30],
            "recurrence": [false, true, true, true, true, true, false],
            "volume": 80,
        }]})))
        .mount(&server)
        .await;

    let events = client.get_events().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].object_id, "event_id_1");
    assert_eq!(events[0].time(), Some((7, 30)));
}

#[tokio::test]
async fn test_get_events_empty() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Event"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    assert!(client.get_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_event_injects_device_pointer() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/parse/classes/Event"))
        .and(body_partial_json(json!({
            "name": "Nap",
            "remi": { "__type": "Pointer", "className": "Remi", "objectId": REMI_ID },
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "objectId": "new_event_id",
            "createdAt": "2024-06-15T10:30:00.000Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = Map::new();
    fields.insert("name".into(), json!("Nap"));
    fields.insert("remi".into(), json!("bogus"));
    let created = client.create_event(fields).await.unwrap();
    assert_eq!(created.object_id, "new_event_id");
}

#[tokio::test]
async fn test_update_and_delete_event() {
    let (server, client) = logged_in().await;

    Mock::given(method("PUT"))
        .and(path("/parse/classes/Event/event_id_1"))
        .and(body_partial_json(json!({"enabled": false})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedAt": "2024-06-15T10:30:00.000Z"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/parse/classes/Event/event_id_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client
        .update_event("event_id_1", &json!({"enabled": false}))
        .await
        .unwrap();
    client.delete_event("event_id_1").await.unwrap();
}
