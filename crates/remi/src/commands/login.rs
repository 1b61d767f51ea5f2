//! `login`: authenticate, pick a device and save it as a profile.

use std::time::Duration;

use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use remi_api::{Credentials, RemiClient, Session, TransportConfig};
use remi_config::{Config, PASSWORD_ENV, Profile};
use remi_core::CoreError;

use crate::cli::{GlobalOpts, LoginArgs, PasswordStore};
use crate::config;
use crate::error::CliError;

use super::util::prompt_err;

fn spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_owned());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn read_password() -> Result<SecretString, CliError> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }
    let pw = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
    if pw.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(pw))
}

/// Choose the device to bind: `--device`, the only device, or a prompt
/// defaulting to the account's current device.
fn choose_device(session: &Session, requested: Option<String>) -> Result<String, CliError> {
    if let Some(id) = requested {
        if session.remi_ids.contains(&id) {
            return Ok(id);
        }
        return Err(CliError::NotFound {
            resource_type: "device".into(),
            identifier: id,
            list_command: "login".into(),
        });
    }
    if session.remi_ids.len() <= 1 {
        return Ok(session.remi_id.clone());
    }

    let default = session
        .remi_ids
        .iter()
        .position(|id| *id == session.remi_id)
        .unwrap_or(0);
    let picked = Select::new()
        .with_prompt("Select a device")
        .items(&session.remi_ids)
        .default(default)
        .interact()
        .map_err(prompt_err)?;
    session
        .remi_ids
        .get(picked)
        .cloned()
        .ok_or_else(|| CliError::Internal("device selection out of range".into()))
}

/// Refuse to bind a device that another profile already owns.
fn ensure_unclaimed(cfg: &Config, remi_id: &str, profile_name: &str) -> Result<(), CliError> {
    match cfg.profile_for_device(remi_id) {
        Some(owner) if owner != profile_name => Err(CliError::AlreadyConfigured {
            remi_id: remi_id.into(),
            profile: owner.into(),
        }),
        _ => Ok(()),
    }
}

pub async fn handle(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let existing = cfg.profiles.get(&profile_name).cloned().unwrap_or_default();

    // 1. Credentials
    let username = match args.username {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Remi account e-mail")
            .interact_text()
            .map_err(prompt_err)?,
    };
    let password = read_password()?;
    let credentials = Credentials::with_new_installation(username.clone(), password.clone());
    let installation_id = credentials.installation_id.clone();

    // 2. Log in
    let base_url_override = args.base_url.or_else(|| existing.base_url.clone());
    let base_url = remi_config::resolve_base_url(&Profile {
        base_url: base_url_override.clone(),
        ..Profile::default()
    })?;
    let timeout = Duration::from_secs(global.timeout.or(existing.timeout).unwrap_or(30));
    let client = RemiClient::new(
        base_url,
        credentials,
        &TransportConfig::default().with_timeout(timeout),
    )
    .map_err(|e| CliError::from_setup(&CoreError::from(e)))?;

    let pb = spinner("Logging in...", global.quiet);
    let session = client.login().await;
    pb.finish_and_clear();
    let session = session.map_err(|e| CliError::from_setup(&CoreError::from(e)))?;

    // 3. Device
    let remi_id = choose_device(&session, args.device)?;
    ensure_unclaimed(&cfg, &remi_id, &profile_name)?;

    // 4. Password storage
    let plaintext = match args.store {
        PasswordStore::Keyring => {
            remi_config::store_password(&profile_name, password.expose_secret())?;
            None
        }
        PasswordStore::Plaintext => Some(password.expose_secret().to_owned()),
        PasswordStore::None => None,
    };

    // 5. Profile
    let profile = Profile {
        username,
        remi_id: Some(remi_id.clone()),
        installation_id: Some(installation_id),
        session_token: Some(session.session_token.expose_secret().to_owned()),
        password: plaintext,
        base_url: base_url_override,
        ..existing
    };
    cfg.profiles.insert(profile_name.clone(), profile);
    if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
        cfg.default_profile = Some(profile_name.clone());
    }
    config::save_config(&cfg)?;

    info!(profile = %profile_name, %remi_id, "profile saved");
    if !global.quiet {
        eprintln!("Logged in; device {remi_id} saved as profile '{profile_name}'");
        eprintln!("  Config: {}", config::config_path().display());
    }
    Ok(())
}
