// Parse Server wire types
//
// Models for the Remi cloud's Parse REST API. Query endpoints wrap their
// payload in `{ "results": [...] }`. The backend is loose about field
// presence, so nearly everything is optional and unknown fields are kept
// in a flattened `extra` map.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const CLASS_REMI: &str = "Remi";
pub const CLASS_FACE: &str = "Face";
pub const CLASS_EVENT: &str = "Event";

/// One RGB light channel as stored on the device (`[r, g, b]`).
pub type Rgb = [u8; 3];

/// Decode an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Parse primitives ─────────────────────────────────────────────────

/// Foreign-key reference embedded in a record:
/// `{"__type":"Pointer","className":"Face","objectId":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pointer {
    #[serde(rename = "__type", default = "pointer_type")]
    pub kind: String,
    #[serde(rename = "className", default)]
    pub class_name: String,
    #[serde(rename = "objectId", default)]
    pub object_id: String,
}

fn pointer_type() -> String {
    "Pointer".into()
}

impl Pointer {
    pub fn new(class_name: &str, object_id: impl Into<String>) -> Self {
        Self {
            kind: pointer_type(),
            class_name: class_name.into(),
            object_id: object_id.into(),
        }
    }

    /// Pointer to a `Remi` device record.
    pub fn remi(object_id: impl Into<String>) -> Self {
        Self::new(CLASS_REMI, object_id)
    }

    /// Pointer to a `Face` record.
    pub fn face(object_id: impl Into<String>) -> Self {
        Self::new(CLASS_FACE, object_id)
    }
}

/// Parse `Date` object: `{"__type":"Date","iso":"..."}`.
///
/// The `iso` string is passed through untouched; the server does the
/// parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDate {
    #[serde(rename = "__type")]
    pub kind: String,
    pub iso: String,
}

impl ParseDate {
    pub fn new(iso: impl Into<String>) -> Self {
        Self {
            kind: "Date".into(),
            iso: iso.into(),
        }
    }
}

/// Query response envelope: `{ "results": [...] }`.
#[derive(Debug, Deserialize)]
pub struct QueryResults<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

// ── Login ────────────────────────────────────────────────────────────

/// Raw `/login` response. Validated by `RemiClient::login`, which
/// rejects a missing token or device reference.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "sessionToken", default)]
    pub session_token: Option<String>,
    /// Usually a pointer-like object; anything else is treated as absent.
    #[serde(rename = "currentRemi", default)]
    pub current_remi: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remis: Vec<RemiRef>,
}

impl LoginResponse {
    /// `currentRemi.objectId`, if present and non-empty.
    pub fn current_remi_id(&self) -> Option<&str> {
        self.current_remi
            .as_ref()
            .and_then(|v| v.get("objectId"))
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// Entry of the login `remis` list: either a bare id or a pointer object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RemiRef {
    Id(String),
    Object {
        #[serde(rename = "objectId")]
        object_id: String,
    },
}

impl RemiRef {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Object { object_id: id } => id,
        }
    }
}

// ── Device ───────────────────────────────────────────────────────────

/// The `Remi` device record.
///
/// Field names mix camelCase and snake_case on the wire; each one is
/// renamed explicitly. Everything not modelled lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Remi {
    #[serde(rename = "objectId", default)]
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alive: Option<bool>,
    /// Raw temperature code: `(temp - 115) / 2` gives degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub luminosity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_firmware_version: Option<i64>,
    #[serde(rename = "ipv4Address", default, skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
    #[serde(rename = "uniqueID", default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<Pointer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lightnight: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_notification_threshold: Option<i64>,
    #[serde(rename = "hourFormat24", default, skip_serializing_if = "Option::is_none")]
    pub hour_format_24: Option<bool>,
    #[serde(rename = "musicMode", default, skip_serializing_if = "Option::is_none")]
    pub music_mode: Option<i64>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Face ─────────────────────────────────────────────────────────────

/// Entry of the `Face` catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    #[serde(rename = "objectId")]
    pub object_id: String,
    /// Firmware symbol, e.g. `FACE_DAY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub define: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Alarm events ─────────────────────────────────────────────────────

/// An alarm (`Event` record) attached to a device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "objectId", default)]
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    /// `[hour, minute]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<Vec<u32>>,
    /// Seven flags, Sunday first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face: Option<Pointer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    /// `(hour, minute)` when `event_time` has at least two entries.
    pub fn time(&self) -> Option<(u32, u32)> {
        match self.event_time.as_deref() {
            Some([hour, minute, ..]) => Some((*hour, *minute)),
            _ => None,
        }
    }
}

// ── Config & write responses ─────────────────────────────────────────

/// Response of `GET /config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl ServerConfig {
    pub const FIRMWARE_UPDATE_PARAM: &'static str = "default_firmware_update_version";

    /// Latest firmware version advertised by the server, if any.
    pub fn latest_firmware_version(&self) -> Option<i64> {
        self.params
            .get(Self::FIRMWARE_UPDATE_PARAM)
            .and_then(Value::as_i64)
    }
}

/// Response of a PUT: `updatedAt` plus whatever fields the server echoes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Response of a create: the new object id and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedObject {
    #[serde(rename = "objectId")]
    pub object_id: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}
