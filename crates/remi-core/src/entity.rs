// ── Entity views ──
//
// Read-only projections of the latest snapshot into the typed entities
// a home-automation host would expose: sensors, binary sensors, numbers,
// selects, lights and one switch per alarm. Everything here is a pure
// function of (device record, alarm list, advertised firmware).

use remi_api::{Event, Remi};
use serde::Serialize;
use serde_json::{Value, json};
use strum::{Display, IntoEnumIterator};

use crate::model::{
    ClockFace, ClockFormat, LightChannel, MusicMode, NumberSetting, firmware_update_available,
    format_time, recurrence_days, temperature_celsius,
};

/// Platform an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Sensor,
    BinarySensor,
    Number,
    Select,
    Light,
    Switch,
}

/// Current state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub unique_id: String,
    pub kind: EntityKind,
    pub name: String,
    /// `null` when the device does not report the value.
    pub state: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
}

/// Static device metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub id: String,
    pub name: String,
    pub manufacturer: &'static str,
    pub model: &'static str,
    pub sw_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    pub configuration_url: String,
}

impl DeviceInfo {
    pub fn from_remi(remi: &Remi) -> Self {
        Self {
            id: remi.object_id.clone(),
            name: remi.name.clone().unwrap_or_else(|| "Remi".into()),
            manufacturer: "UrbanHello",
            model: "Remi",
            sw_version: remi
                .current_firmware_version
                .map(|v| v.to_string())
                .unwrap_or_default(),
            serial_number: remi.unique_id.clone(),
            configuration_url: format!("http://{}", remi.ipv4_address.as_deref().unwrap_or("")),
        }
    }
}

/// `{device_id}_{key}`.
pub fn unique_id(device_id: &str, key: &str) -> String {
    format!("{device_id}_{key}")
}

/// Unique id of the switch bound to an alarm: `{device_id}_alarm_{event_id}`.
pub fn alarm_unique_id(device_id: &str, event_id: &str) -> String {
    format!("{device_id}_alarm_{event_id}")
}

/// Name of the current face, `"Unknown"` when unresolvable.
pub fn current_face_name(remi: &Remi) -> String {
    ClockFace::from_pointer(remi.face.as_ref())
        .map_or_else(|| "Unknown".to_owned(), |f| f.to_string())
}

// ── Device entities ──────────────────────────────────────────────────

/// Every non-alarm entity of a device, in platform order.
pub fn device_entities(remi: &Remi, latest_firmware: Option<i64>) -> Vec<EntityState> {
    let id = remi.object_id.as_str();
    let entity = |kind, key: &str, name: &str, state: Value, unit| EntityState {
        unique_id: unique_id(id, key),
        kind,
        name: name.to_owned(),
        state,
        unit,
    };

    let mut out = vec![
        // Sensors
        entity(
            EntityKind::Sensor,
            "temperature",
            "Temperature",
            json!(remi.temp.map(temperature_celsius)),
            Some("°C"),
        ),
        entity(
            EntityKind::Sensor,
            "luminosity",
            "Luminosity",
            json!(remi.luminosity),
            Some("lx"),
        ),
        entity(
            EntityKind::Sensor,
            "rssi",
            "WiFi Signal",
            json!(remi.rssi),
            Some("dBm"),
        ),
        entity(
            EntityKind::Sensor,
            "firmware_version",
            "Firmware Version",
            json!(remi.current_firmware_version),
            None,
        ),
        entity(
            EntityKind::Sensor,
            "ip_address",
            "IP Address",
            json!(remi.ipv4_address),
            None,
        ),
        entity(
            EntityKind::Sensor,
            "current_face",
            "Current Face",
            json!(current_face_name(remi)),
            None,
        ),
        // Binary sensors
        entity(
            EntityKind::BinarySensor,
            "online",
            "Online",
            json!(remi.online.unwrap_or(false)),
            None,
        ),
        entity(
            EntityKind::BinarySensor,
            "alive",
            "Alive",
            json!(remi.alive.unwrap_or(false)),
            None,
        ),
        entity(
            EntityKind::BinarySensor,
            "firmware_update",
            "Firmware Update Available",
            json!(firmware_update_available(
                remi.current_firmware_version,
                latest_firmware
            )),
            None,
        ),
    ];

    for setting in NumberSetting::iter() {
        let key = match setting {
            NumberSetting::Volume => "volume",
            NumberSetting::Luminosity => "luminosity",
            NumberSetting::NoiseThreshold => "noise_threshold",
        };
        out.push(entity(
            EntityKind::Number,
            key,
            setting.label(),
            json!(setting.value(remi)),
            None,
        ));
    }

    out.push(entity(
        EntityKind::Select,
        "face",
        "Clock Face",
        json!(ClockFace::from_pointer(remi.face.as_ref()).map(|f| f.to_string())),
        None,
    ));
    out.push(entity(
        EntityKind::Select,
        "clock_format",
        "Clock Format",
        json!(ClockFormat::of(remi).to_string()),
        None,
    ));
    out.push(entity(
        EntityKind::Select,
        "music_mode",
        "Music Mode",
        json!(MusicMode::of(remi).map(|m| m.to_string())),
        None,
    ));

    for channel in LightChannel::iter() {
        let key = match channel {
            LightChannel::NightLight => "night_light",
            LightChannel::Background => "background_color",
        };
        out.push(entity(
            EntityKind::Light,
            key,
            channel.label(),
            json!({
                "on": channel.is_on(remi),
                "rgb": channel.color(remi),
            }),
            None,
        ));
    }

    out
}

// ── Alarm switches ───────────────────────────────────────────────────

/// Attributes exposed on an alarm switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlarmAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brightness: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face: Option<String>,
}

/// One switch per alarm; `is_on` mirrors the alarm's enabled flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmSwitch {
    pub unique_id: String,
    pub event_id: String,
    pub name: String,
    pub is_on: bool,
    pub attributes: AlarmAttributes,
}

impl AlarmSwitch {
    pub fn from_event(device_id: &str, event: &Event) -> Self {
        let attributes = AlarmAttributes {
            time: event.time().map(|(h, m)| format_time(h, m)),
            recurrence: event.recurrence.as_deref().map(recurrence_days),
            brightness: event.brightness,
            volume: event.volume,
            length_min: event.length_min,
            face: ClockFace::from_pointer(event.face.as_ref()).map(|f| f.to_string()),
        };
        Self {
            unique_id: alarm_unique_id(device_id, &event.object_id),
            event_id: event.object_id.clone(),
            name: event
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Alarm {}", event.object_id)),
            is_on: event.enabled,
            attributes,
        }
    }
}

/// Switches for every alarm with an id.
pub fn alarm_switches(device_id: &str, events: &[Event]) -> Vec<AlarmSwitch> {
    events
        .iter()
        .filter(|e| !e.object_id.is_empty())
        .map(|e| AlarmSwitch::from_event(device_id, e))
        .collect()
}
