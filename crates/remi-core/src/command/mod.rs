// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// coordinator routes each variant to a device or alarm update and then
// requests a refresh so the change shows up in the next snapshot.

pub mod requests;

use remi_api::Rgb;

use crate::model::{ClockFace, ClockFormat, LightChannel, MusicMode, NumberSetting};

pub use requests::{CreateAlarmRequest, UpdateAlarmRequest};

/// All possible write operations against a Remi.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Device settings ──────────────────────────────────────────────
    SetNumber {
        setting: NumberSetting,
        value: u8,
    },
    SetFace {
        face: ClockFace,
    },
    SetClockFormat {
        format: ClockFormat,
    },
    SetMusicMode {
        mode: MusicMode,
    },

    // ── Lights ───────────────────────────────────────────────────────
    /// Switch a channel on. Without a colour, the current colour is kept
    /// (white if the channel is black).
    LightOn {
        channel: LightChannel,
        rgb: Option<Rgb>,
    },
    LightOff {
        channel: LightChannel,
    },

    // ── Alarms ───────────────────────────────────────────────────────
    SetAlarmEnabled {
        event_id: String,
        enabled: bool,
    },
    CreateAlarm(CreateAlarmRequest),
    UpdateAlarm {
        event_id: String,
        update: UpdateAlarmRequest,
    },
    DeleteAlarm {
        event_id: String,
    },
}

/// Outcome of a successful command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Ok,
    /// A new alarm was created with this object id.
    Created { id: String },
}
