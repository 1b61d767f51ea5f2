//! CLI glue over `remi-config`: picks the active profile, applies
//! `GlobalOpts` overrides and writes refreshed sessions back.

use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::debug;

use remi_api::RemiClient;
use remi_config::{Config, Profile};
use remi_core::CoordinatorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use remi_config::{config_path, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Look up the active profile.
pub fn active_profile(global: &GlobalOpts) -> Result<(String, Profile), CliError> {
    let cfg = remi_config::load_config()?;
    let name = active_profile_name(global, &cfg);
    match cfg.profiles.get(&name) {
        Some(profile) => Ok((name, profile.clone())),
        None => Err(CliError::ProfileNotFound {
            available: available_profiles(&cfg),
            name,
        }),
    }
}

/// Build the coordinator config for the active profile.
pub fn coordinator_config(global: &GlobalOpts) -> Result<(String, CoordinatorConfig), CliError> {
    let (name, profile) = active_profile(global)?;
    let mut config = remi_config::profile_to_coordinator_config(&profile, &name)?;
    if let Some(secs) = global.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    Ok((name, config))
}

/// Store the client's current session in the profile if it changed
/// (after a transparent re-login, for instance).
pub fn persist_session(profile_name: &str, client: &RemiClient) -> Result<(), CliError> {
    let Some(token) = client.session_token() else {
        return Ok(());
    };
    let mut cfg = remi_config::load_config()?;
    let Some(profile) = cfg.profiles.get_mut(profile_name) else {
        return Ok(());
    };

    let token = token.expose_secret();
    if profile.session_token.as_deref() == Some(token) {
        return Ok(());
    }
    debug!(profile = profile_name, "persisting refreshed session");
    profile.session_token = Some(token.to_owned());
    if let Some(remi_id) = client.remi_id() {
        profile.remi_id = Some(remi_id);
    }
    save_config(&cfg)?;
    Ok(())
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
