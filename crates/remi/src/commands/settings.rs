//! `set` handlers: number, select and clock settings.

use remi_core::{ClockFace, ClockFormat, Command as CoreCommand, Coordinator, MusicMode, NumberSetting};

use crate::cli::{GlobalOpts, SetArgs, SetCommand};
use crate::error::CliError;

/// Translate a `set` subcommand into a core command and a confirmation line.
fn to_core(cmd: SetCommand) -> (CoreCommand, String) {
    let number = |setting: NumberSetting, value: u8| {
        (
            CoreCommand::SetNumber { setting, value },
            format!("{} set to {value}", setting.label()),
        )
    };

    match cmd {
        SetCommand::Volume { value } => number(NumberSetting::Volume, value),
        SetCommand::Brightness { value } => number(NumberSetting::Luminosity, value),
        SetCommand::NoiseThreshold { value } => number(NumberSetting::NoiseThreshold, value),
        SetCommand::Face { face } => {
            let face = ClockFace::from(face);
            (
                CoreCommand::SetFace { face },
                format!("Clock face set to {face}"),
            )
        }
        SetCommand::ClockFormat { format } => {
            let format = ClockFormat::from(format);
            (
                CoreCommand::SetClockFormat { format },
                format!("Clock format set to {format}"),
            )
        }
        SetCommand::Music { mode } => {
            let mode = MusicMode::from(mode);
            (
                CoreCommand::SetMusicMode { mode },
                format!("Music mode set to {mode}"),
            )
        }
    }
}

pub async fn handle(
    coordinator: &Coordinator,
    args: SetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (cmd, done) = to_core(args.command);
    coordinator.execute(cmd).await?;
    if !global.quiet {
        eprintln!("{done}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ClockFormatArg, MusicModeArg};

    #[test]
    fn brightness_targets_luminosity() {
        let (cmd, _) = to_core(SetCommand::Brightness { value: 40 });
        assert!(matches!(
            cmd,
            CoreCommand::SetNumber {
                setting: NumberSetting::Luminosity,
                value: 40
            }
        ));
    }

    #[test]
    fn select_settings_convert() {
        let (cmd, msg) = to_core(SetCommand::ClockFormat {
            format: ClockFormatArg::H12,
        });
        assert!(matches!(
            cmd,
            CoreCommand::SetClockFormat {
                format: ClockFormat::H12
            }
        ));
        assert_eq!(msg, "Clock format set to 12h");

        let (_, msg) = to_core(SetCommand::Music {
            mode: MusicModeArg::WhiteNoise,
        });
        assert_eq!(msg, "Music mode set to White Noise");
    }
}
