//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod alarms;
pub mod config_cmd;
pub mod device;
pub mod light;
pub mod login;
pub mod settings;
pub mod util;
pub mod watch;

use remi_core::Coordinator;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    coordinator: &Coordinator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => device::status(coordinator, global),
        Command::Faces => device::faces(coordinator, global),
        Command::Alarms(args) => alarms::handle(coordinator, args, global).await,
        Command::Set(args) => settings::handle(coordinator, args, global).await,
        Command::Light(args) => light::handle(coordinator, args, global).await,
        // Handled before a coordinator is built
        Command::Login(_) | Command::Watch(_) | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Internal("command dispatched to the wrong handler".into()))
        }
    }
}
