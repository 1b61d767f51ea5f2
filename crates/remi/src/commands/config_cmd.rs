//! Config subcommand handlers.

use serde::Serialize;
use tabled::Tabled;

use remi_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of `cfg` with passwords and session tokens masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
        if profile.session_token.is_some() {
            profile.session_token = Some(MASK.into());
        }
    }
    cfg
}

fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "username = \"{}\"", p.username);
        let strings = [
            ("remi_id", &p.remi_id),
            ("installation_id", &p.installation_id),
            ("session_token", &p.session_token),
            ("password", &p.password),
            ("password_env", &p.password_env),
            ("base_url", &p.base_url),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                let _ = writeln!(out, "{key} = \"{v}\"");
            }
        }
        if let Some(secs) = p.scan_interval {
            let _ = writeln!(out, "scan_interval = {secs}");
        }
        if let Some(secs) = p.timeout {
            let _ = writeln!(out, "timeout = {secs}");
        }
    }

    out
}

#[derive(Serialize)]
struct ProfileInfo {
    name: String,
    username: String,
    remi_id: Option<String>,
    default: bool,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Account")]
    username: String,
    #[tabled(rename = "Device")]
    remi_id: String,
    #[tabled(rename = "Default")]
    default: String,
}

fn profile_infos(cfg: &Config) -> Vec<ProfileInfo> {
    let default = cfg.active_profile_name(None);
    cfg.profiles
        .iter()
        .map(|(name, p)| ProfileInfo {
            default: *name == default,
            name: name.clone(),
            username: p.username.clone(),
            remi_id: p.remi_id.clone(),
        })
        .collect()
}

fn profile_row(info: &ProfileInfo) -> ProfileRow {
    ProfileRow {
        name: info.name.clone(),
        username: info.username.clone(),
        remi_id: info.remi_id.clone().unwrap_or_else(|| "-".into()),
        default: if info.default { "*".into() } else { String::new() },
    }
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    CliError::ProfileNotFound {
        available: config::available_profiles(cfg),
        name,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                if !global.quiet {
                    eprintln!("No profiles configured. Run: remi login");
                }
                return Ok(());
            }
            let infos = profile_infos(&cfg);
            let out =
                output::render_list(&global.output, &infos, profile_row, |p| p.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }

        ConfigCommand::Remove { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            if !util::confirm(&format!("Remove profile '{name}'?"), global.yes)? {
                return Ok(());
            }
            cfg.profiles.remove(&name);
            if cfg.default_profile.as_deref() == Some(name.as_str()) {
                cfg.default_profile = cfg.profiles.keys().next().cloned();
            }
            remi_config::delete_password(&name);
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Profile '{name}' removed");
            }
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }

            let password = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            remi_config::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("Password for '{name}' stored in system keyring");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use remi_config::Profile;

    use super::*;

    fn sample() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                username: "me@example.com".into(),
                remi_id: Some("r1".into()),
                session_token: Some("r:secret".into()),
                password: Some("hunter2".into()),
                ..Profile::default()
            },
        );
        cfg.profiles.insert(
            "cabin".into(),
            Profile {
                username: "me@example.com".into(),
                ..Profile::default()
            },
        );
        cfg
    }

    #[test]
    fn show_never_prints_secrets() {
        let text = format_config(&redacted(&sample()));
        assert!(!text.contains("hunter2"));
        assert!(!text.contains("r:secret"));
        assert!(text.contains("password = \"****\""));
        assert!(text.contains("[profiles.cabin]"));
    }

    #[test]
    fn redaction_leaves_missing_secrets_missing() {
        let cfg = redacted(&sample());
        let cabin = cfg.profiles.get("cabin").unwrap();
        assert_eq!(cabin.password, None);
        assert_eq!(cabin.session_token, None);
    }

    #[test]
    fn profiles_mark_default() {
        let infos = profile_infos(&sample());
        let marked: Vec<_> = infos
            .iter()
            .filter(|p| p.default)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(marked, ["default"]);
        // BTreeMap order: "cabin" sorts first and has no device.
        assert_eq!(profile_row(&infos[0]).remi_id, "-");
    }
}
