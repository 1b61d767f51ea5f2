//! Device overview handlers: `status` and `faces`.

use chrono::{DateTime, Utc};
use remi_core::entity::{DeviceInfo, EntityState, current_face_name, device_entities};
use remi_core::{ClockFace, Coordinator};
use serde::Serialize;
use serde_json::Value;
use strum::IntoEnumIterator;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, Painter};

use super::util;

// ── Status ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusView {
    device: DeviceInfo,
    fetched_at: DateTime<Utc>,
    entities: Vec<EntityState>,
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "State")]
    state: String,
}

fn format_state(entity: &EntityState, painter: Painter) -> String {
    let value = match &entity.state {
        Value::Null => return "-".into(),
        Value::Bool(b) => return painter.on_off(*b),
        Value::Object(light) => {
            let on = light.get("on").and_then(Value::as_bool).unwrap_or(false);
            let rgb = light.get("rgb").map(Value::to_string).unwrap_or_default();
            return format!("{} {rgb}", painter.on_off(on));
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match entity.unit {
        Some(unit) => format!("{value} {unit}"),
        None => value,
    }
}

fn status_detail(view: &StatusView, painter: Painter) -> String {
    let rows: Vec<EntityRow> = view
        .entities
        .iter()
        .map(|e| EntityRow {
            name: e.name.clone(),
            kind: e.kind.to_string(),
            state: format_state(e, painter),
        })
        .collect();
    format!(
        "{} ({})  firmware {}  updated {}\n{}",
        view.device.name,
        view.device.id,
        view.device.sw_version,
        view.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"),
        Table::new(rows).with(Style::rounded())
    )
}

pub fn status(coordinator: &Coordinator, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = util::require_snapshot(coordinator)?;
    let view = StatusView {
        device: DeviceInfo::from_remi(&snapshot.remi),
        fetched_at: snapshot.fetched_at,
        entities: device_entities(&snapshot.remi, coordinator.latest_firmware_version()),
    };
    let painter = Painter::new(&global.color);

    let out = output::render_single(
        &global.output,
        &view,
        |v| status_detail(v, painter),
        |v| {
            v.entities
                .iter()
                .map(|e| format!("{}={}", e.unique_id, e.state))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Faces ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct FaceInfo {
    name: String,
    define: String,
    object_id: String,
    current: bool,
}

#[derive(Tabled)]
struct FaceRow {
    #[tabled(rename = "Face")]
    name: String,
    #[tabled(rename = "Symbol")]
    define: String,
    #[tabled(rename = "ID")]
    object_id: String,
    #[tabled(rename = "Current")]
    current: String,
}

/// Faces from the server catalog, or the built-in table when the
/// catalog could not be fetched.
fn face_infos(coordinator: &Coordinator) -> Vec<FaceInfo> {
    let current = current_face_name(&coordinator.remi());
    let catalog = coordinator.faces();

    if catalog.is_empty() {
        return ClockFace::iter()
            .map(|f| FaceInfo {
                name: f.to_string(),
                define: f.define().into(),
                object_id: f.object_id().into(),
                current: f.to_string() == current,
            })
            .collect();
    }

    catalog
        .iter()
        .map(|face| {
            let known = ClockFace::from_object_id(&face.object_id);
            let name = known
                .map(|f| f.to_string())
                .or_else(|| face.name.clone())
                .unwrap_or_else(|| face.object_id.clone());
            FaceInfo {
                current: known.is_some() && name == current,
                define: face.define.clone().unwrap_or_default(),
                object_id: face.object_id.clone(),
                name,
            }
        })
        .collect()
}

pub fn faces(coordinator: &Coordinator, global: &GlobalOpts) -> Result<(), CliError> {
    let faces = face_infos(coordinator);
    let out = output::render_list(
        &global.output,
        &faces,
        |f| FaceRow {
            name: f.name.clone(),
            define: f.define.clone(),
            object_id: f.object_id.clone(),
            current: if f.current { "*".into() } else { String::new() },
        },
        |f| f.name.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use remi_core::EntityKind;
    use serde_json::json;

    use super::*;
    use crate::cli::ColorMode;

    fn entity(state: Value, unit: Option<&'static str>) -> EntityState {
        EntityState {
            unique_id: "r_x".into(),
            kind: EntityKind::Sensor,
            name: "X".into(),
            state,
            unit,
        }
    }

    #[test]
    fn states_render_with_units_and_placeholders() {
        let p = Painter::new(&ColorMode::Never);
        assert_eq!(format_state(&entity(json!(21.0), Some("°C")), p), "21.0 °C");
        assert_eq!(format_state(&entity(Value::Null, Some("lx")), p), "-");
        assert_eq!(format_state(&entity(json!("Sleepy"), None), p), "Sleepy");
        assert_eq!(format_state(&entity(json!(true), None), p), "on");
        assert_eq!(
            format_state(&entity(json!({"on": false, "rgb": [0, 0, 0]}), None), p),
            "off [0,0,0]"
        );
    }
}
