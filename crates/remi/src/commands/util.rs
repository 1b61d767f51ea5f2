//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::sync::Arc;

use remi_api::{Event, Rgb};
use remi_core::{ClockFace, ClockFormat, Coordinator, LightChannel, MusicMode, Snapshot};

use crate::cli::{ClockFormatArg, FaceArg, LightArg, MusicModeArg};
use crate::error::CliError;

/// The snapshot from the coordinator's first refresh.
pub fn require_snapshot(coordinator: &Coordinator) -> Result<Arc<Snapshot>, CliError> {
    coordinator.snapshot().ok_or(CliError::NotReady)
}

/// The device id all unique ids are built from.
pub fn device_id(coordinator: &Coordinator) -> Result<String, CliError> {
    coordinator.device_id().ok_or(CliError::NotReady)
}

/// Find an alarm by object id in the current snapshot.
pub fn find_event(coordinator: &Coordinator, id: &str) -> Result<Event, CliError> {
    require_snapshot(coordinator)?
        .events
        .iter()
        .find(|e| e.object_id == id)
        .cloned()
        .ok_or_else(|| CliError::NotFound {
            resource_type: "alarm".into(),
            identifier: id.into(),
            list_command: "alarms list".into(),
        })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
/// Without a terminal there is nobody to ask, so `--yes` is required.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.trim_end_matches('?').to_owned(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Parse `r,g,b`.
pub fn parse_rgb(raw: &str) -> Result<Rgb, CliError> {
    let invalid = || CliError::Validation {
        field: "rgb".into(),
        reason: format!("expected three comma-separated values 0-255, got '{raw}'"),
    };
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| invalid())?;
    match parts.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        _ => Err(invalid()),
    }
}

// ── CLI value enums → core types ─────────────────────────────────────

impl From<FaceArg> for ClockFace {
    fn from(arg: FaceArg) -> Self {
        match arg {
            FaceArg::Off => Self::Off,
            FaceArg::Awake => Self::Awake,
            FaceArg::Sleepy => Self::Sleepy,
            FaceArg::SemiAwake => Self::SemiAwake,
            FaceArg::Smiley => Self::Smiley,
        }
    }
}

impl From<ClockFormatArg> for ClockFormat {
    fn from(arg: ClockFormatArg) -> Self {
        match arg {
            ClockFormatArg::H12 => Self::H12,
            ClockFormatArg::H24 => Self::H24,
        }
    }
}

impl From<MusicModeArg> for MusicMode {
    fn from(arg: MusicModeArg) -> Self {
        match arg {
            MusicModeArg::Off => Self::Off,
            MusicModeArg::Music => Self::Music,
            MusicModeArg::WhiteNoise => Self::WhiteNoise,
        }
    }
}

impl From<LightArg> for LightChannel {
    fn from(arg: LightArg) -> Self {
        match arg {
            LightArg::NightLight => Self::NightLight,
            LightArg::Background => Self::Background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_triplets() {
        assert!(matches!(parse_rgb("255, 0,16"), Ok([255, 0, 16])));
        assert!(parse_rgb("1,2").is_err());
        assert!(parse_rgb("1,2,300").is_err());
        assert!(parse_rgb("red").is_err());
    }
}
