mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use remi_core::Coordinator;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Commands that work without a configured device
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Login(args) => commands::login::handle(args, &cli.global).await,

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "remi", &mut std::io::stdout());
            Ok(())
        }

        Command::Watch(args) => {
            let (profile_name, config) = config::coordinator_config(&cli.global)?;
            commands::watch::handle(config, &profile_name, args, &cli.global)
                .await
                .map_err(|e| e.with_profile(&profile_name))
        }

        // Everything else runs against a single, non-polling coordinator
        cmd => {
            let (profile_name, config) = config::coordinator_config(&cli.global)?;
            let coordinator = Coordinator::new(config.with_scan_interval(Duration::ZERO))?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result: Result<(), CliError> = async {
                coordinator.start().await?;
                commands::dispatch(cmd, &coordinator, &cli.global).await
            }
            .await;

            if let Err(e) = config::persist_session(&profile_name, coordinator.client()) {
                tracing::warn!(error = %e, "could not save session");
            }
            coordinator.shutdown().await;
            result.map_err(|e| e.with_profile(&profile_name))
        }
    }
}
