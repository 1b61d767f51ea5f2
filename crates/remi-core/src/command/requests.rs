// ── Typed request structs for alarm commands ──
//
// Mirror the create/update alarm operations: a name, an ISO time, an
// enabled flag, repeat weekdays (0 = Sunday), an optional face and an
// optional volume. `into_fields` validates and renders the Parse payload.

use remi_api::ParseDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::error::CoreError;
use crate::model::ClockFace;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAlarmRequest {
    pub name: String,
    /// ISO 8601 time, forwarded verbatim as a Parse `Date`.
    pub time: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Weekday indices, 0 = Sunday.
    #[serde(default)]
    pub repeat: Vec<u8>,
    /// Face name or firmware symbol. Unknown values are ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
}

fn default_enabled() -> bool {
    true
}

impl CreateAlarmRequest {
    pub fn new(name: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: time.into(),
            enabled: true,
            repeat: Vec::new(),
            face: None,
            volume: None,
        }
    }

    /// Validate and render the `Event` payload (without the device
    /// pointer, which the client injects).
    pub fn into_fields(self) -> Result<Map<String, Value>, CoreError> {
        validate_repeat(&self.repeat)?;
        validate_volume(self.volume)?;

        let mut fields = Map::new();
        fields.insert("name".into(), json!(self.name));
        fields.insert("time".into(), json!(ParseDate::new(self.time)));
        fields.insert("enabled".into(), json!(self.enabled));
        fields.insert("repeat".into(), json!(self.repeat));
        insert_face(&mut fields, self.face.as_deref());
        if let Some(volume) = self.volume {
            fields.insert("volume".into(), json!(volume));
        }
        Ok(fields)
    }
}

/// Partial alarm update. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAlarmRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
}

impl UpdateAlarmRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn into_fields(self) -> Result<Map<String, Value>, CoreError> {
        if let Some(ref repeat) = self.repeat {
            validate_repeat(repeat)?;
        }
        validate_volume(self.volume)?;

        let mut fields = Map::new();
        if let Some(name) = self.name {
            fields.insert("name".into(), json!(name));
        }
        if let Some(time) = self.time {
            fields.insert("time".into(), json!(ParseDate::new(time)));
        }
        if let Some(enabled) = self.enabled {
            fields.insert("enabled".into(), json!(enabled));
        }
        if let Some(repeat) = self.repeat {
            fields.insert("repeat".into(), json!(repeat));
        }
        if let Some(volume) = self.volume {
            fields.insert("volume".into(), json!(volume));
        }
        insert_face(&mut fields, self.face.as_deref());
        Ok(fields)
    }
}

// ── Validation ───────────────────────────────────────────────────────

fn validate_repeat(repeat: &[u8]) -> Result<(), CoreError> {
    match repeat.iter().find(|&&day| day > 6) {
        Some(day) => Err(CoreError::validation(format!(
            "repeat day {day} out of range (0 = Sunday .. 6 = Saturday)"
        ))),
        None => Ok(()),
    }
}

fn validate_volume(volume: Option<u8>) -> Result<(), CoreError> {
    match volume {
        Some(v) if v > 100 => Err(CoreError::validation(format!(
            "volume {v} out of range (0-100)"
        ))),
        _ => Ok(()),
    }
}

fn insert_face(fields: &mut Map<String, Value>, face: Option<&str>) {
    let Some(face) = face else { return };
    match ClockFace::parse(face) {
        Some(face) => {
            fields.insert("face".into(), json!(face.pointer()));
        }
        None => warn!(face, "ignoring unknown clock face"),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn create_renders_parse_payload() {
        let req = CreateAlarmRequest {
            repeat: vec![1, 2, 3],
            face: Some("FACE_DAY".into()),
            volume: Some(80),
            ..CreateAlarmRequest::new("Morning", "2024-01-01T07:30:00.000Z")
        };
        let fields = Value::Object(req.into_fields().unwrap());

        assert_eq!(
            fields,
            json!({
                "name": "Morning",
                "time": {"__type": "Date", "iso": "2024-01-01T07:30:00.000Z"},
                "enabled": true,
                "repeat": [1, 2, 3],
                "face": {"__type": "Pointer", "className": "Face", "objectId": "fIjF0yWRxX"},
                "volume": 80,
            })
        );
    }

    #[test]
    fn unknown_face_is_dropped() {
        let req = CreateAlarmRequest {
            face: Some("FACE_NOPE".into()),
            ..CreateAlarmRequest::new("Nap", "2024-01-01T13:00:00.000Z")
        };
        assert!(!req.into_fields().unwrap().contains_key("face"));
    }

    #[test]
    fn repeat_out_of_range_is_rejected() {
        let req = CreateAlarmRequest {
            repeat: vec![0, 7],
            ..CreateAlarmRequest::new("Nap", "t")
        };
        assert!(matches!(req.into_fields(), Err(CoreError::ValidationFailed { .. })));
    }

    #[test]
    fn volume_over_100_is_rejected() {
        let req = UpdateAlarmRequest {
            volume: Some(101),
            ..UpdateAlarmRequest::default()
        };
        assert!(matches!(req.into_fields(), Err(CoreError::ValidationFailed { .. })));
    }

    #[test]
    fn update_sends_only_set_fields() {
        let req = UpdateAlarmRequest {
            enabled: Some(false),
            time: Some("2024-01-01T08:00:00.000Z".into()),
            ..UpdateAlarmRequest::default()
        };
        assert!(!req.is_empty());
        let fields = Value::Object(req.into_fields().unwrap());
        assert_eq!(
            fields,
            json!({
                "enabled": false,
                "time": {"__type": "Date", "iso": "2024-01-01T08:00:00.000Z"},
            })
        );
        assert!(UpdateAlarmRequest::default().is_empty());
    }
}
