//! `light` handlers for the two RGB channels.

use remi_core::{Command as CoreCommand, Coordinator, LightChannel};

use crate::cli::{GlobalOpts, LightArgs, LightCommand};
use crate::error::CliError;

use super::util;

pub async fn handle(
    coordinator: &Coordinator,
    args: LightArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (cmd, channel) = match args.command {
        LightCommand::On { channel, rgb } => {
            let channel = LightChannel::from(channel);
            let rgb = rgb.as_deref().map(util::parse_rgb).transpose()?;
            (CoreCommand::LightOn { channel, rgb }, channel)
        }
        LightCommand::Off { channel } => {
            let channel = LightChannel::from(channel);
            (CoreCommand::LightOff { channel }, channel)
        }
    };

    coordinator.execute(cmd).await?;

    if !global.quiet {
        let remi = coordinator.remi();
        let [r, g, b] = channel.color(&remi);
        let state = if channel.is_on(&remi) { "on" } else { "off" };
        eprintln!("{} {state} [{r}, {g}, {b}]", channel.label());
    }
    Ok(())
}
