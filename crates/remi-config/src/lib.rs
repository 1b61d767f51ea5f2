//! Persistent configuration for the Remi CLI.
//!
//! A TOML file holds named profiles, one per configured device. Each
//! profile records the account, the selected device, the installation
//! id generated at login and the last session token. Passwords resolve
//! through env var, system keyring, then plaintext.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use remi_api::Credentials;
use remi_core::{CoordinatorConfig, DEFAULT_SCAN_INTERVAL_SECS};

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "remi";

/// Env var overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "REMI_CONFIG";

/// Env var consulted for the password when a profile names none.
pub const PASSWORD_ENV: &str = "REMI_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{profile}' has no {field}; run `remi login` first")]
    Incomplete { profile: String, field: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile already bound to `remi_id`, if any.
    pub fn profile_for_device(&self, remi_id: &str) -> Option<&str> {
        self.profiles
            .iter()
            .find(|(_, p)| p.remi_id.as_deref() == Some(remi_id))
            .map(|(name, _)| name.as_str())
    }

    /// `explicit`, else `default_profile`, else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named device profile.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Account e-mail.
    pub username: String,

    /// Selected device (`objectId` of the Remi record).
    pub remi_id: Option<String>,

    /// Installation UUID generated at login and reused afterwards.
    pub installation_id: Option<String>,

    /// Last known session token.
    pub session_token: Option<String>,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Parse API base URL override.
    pub base_url: Option<String>,

    /// Poll interval in seconds for `watch`.
    pub scan_interval: Option<u64>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `REMI_CONFIG`, else the platform
/// config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("com", "remi", "remi").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("remi");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path`, layered over defaults and under
/// `REMI_`-prefixed env vars (`__` separates nested keys).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("REMI_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Remove a profile's password from the system keyring, if present.
pub fn delete_password(profile_name: &str) {
    let result = keyring_entry(profile_name)
        .and_then(|entry| entry.delete_credential().map_err(ConfigError::from))
        .or_else(|e| if is_missing_entry(&e) { Ok(()) } else { Err(e) });
    if let Err(e) = result {
        warn!(profile = profile_name, error = %e, "could not remove keyring password");
    }
}

/// Nothing stored under the entry; deleting it is a no-op.
fn is_missing_entry(err: &ConfigError) -> bool {
    matches!(err, ConfigError::Keyring(keyring::Error::NoEntry))
}

/// Resolve the password: profile env var (or `REMI_PASSWORD`), then
/// keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    let env_name = profile.password_env.as_deref().unwrap_or(PASSWORD_ENV);
    if let Ok(pw) = std::env::var(env_name) {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Base URL for a profile: its override, else production.
pub fn resolve_base_url(profile: &Profile) -> Result<url::Url, ConfigError> {
    let raw = profile
        .base_url
        .as_deref()
        .unwrap_or(remi_api::DEFAULT_BASE_URL);
    raw.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `CoordinatorConfig` from a profile, with the password
/// already resolved.
pub fn build_coordinator_config(
    profile: &Profile,
    profile_name: &str,
    password: SecretString,
) -> Result<CoordinatorConfig, ConfigError> {
    let installation_id = profile
        .installation_id
        .clone()
        .ok_or_else(|| ConfigError::Incomplete {
            profile: profile_name.into(),
            field: "installation_id".into(),
        })?;
    let credentials = Credentials::new(profile.username.clone(), password, installation_id);

    let mut config = CoordinatorConfig::new(credentials)
        .map_err(|e| ConfigError::Validation {
            field: "base_url".into(),
            reason: e.to_string(),
        })?
        .with_base_url(resolve_base_url(profile)?)
        .with_timeout(Duration::from_secs(profile.timeout.unwrap_or(30)))
        .with_scan_interval(Duration::from_secs(
            profile.scan_interval.unwrap_or(DEFAULT_SCAN_INTERVAL_SECS),
        ));

    if let Some(ref remi_id) = profile.remi_id {
        config = config.with_remi_id(remi_id.clone());
        if let Some(ref token) = profile.session_token {
            config = config.with_session_token(SecretString::from(token.clone()));
        }
    }
    Ok(config)
}

/// Build a `CoordinatorConfig` from a profile, resolving the password
/// through the credential chain.
pub fn profile_to_coordinator_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<CoordinatorConfig, ConfigError> {
    let password = resolve_password(profile, profile_name)?;
    build_coordinator_config(profile, profile_name, password)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile() -> Profile {
        Profile {
            username: "parent@example.com".into(),
            remi_id: Some("remi_1".into()),
            installation_id: Some("install-1".into()),
            session_token: Some("tok".into()),
            password: Some("hunter2".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert("home".into(), profile());
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["home"], profile());
        assert_eq!(loaded.defaults.timeout, 30);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
        assert!(loaded.profiles.is_empty());
    }

    #[test]
    fn profile_for_device_finds_owner() {
        let mut cfg = Config::default();
        cfg.profiles.insert("home".into(), profile());
        assert_eq!(cfg.profile_for_device("remi_1"), Some("home"));
        assert_eq!(cfg.profile_for_device("other"), None);
    }

    #[test]
    fn active_profile_prefers_explicit() {
        let cfg = Config {
            default_profile: Some("home".into()),
            ..Config::default()
        };
        assert_eq!(cfg.active_profile_name(Some("cabin")), "cabin");
        assert_eq!(cfg.active_profile_name(None), "home");
    }

    #[test]
    fn coordinator_config_restores_session() {
        let cfg = build_coordinator_config(
            &profile(),
            "home",
            SecretString::from("pw".to_owned()),
        )
        .unwrap();

        assert_eq!(cfg.remi_id.as_deref(), Some("remi_1"));
        assert_eq!(cfg.session_token.unwrap().expose_secret(), "tok");
        assert_eq!(cfg.credentials.installation_id, "install-1");
        assert_eq!(cfg.base_url.as_str(), remi_api::DEFAULT_BASE_URL);
        assert_eq!(
            cfg.scan_interval,
            Duration::from_secs(DEFAULT_SCAN_INTERVAL_SECS)
        );
    }

    #[test]
    fn coordinator_config_requires_installation_id() {
        let p = Profile {
            installation_id: None,
            ..profile()
        };
        let err = build_coordinator_config(&p, "home", SecretString::from("pw".to_owned()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Incomplete { .. }));
    }

    #[test]
    fn only_missing_keyring_entry_is_silent() {
        assert!(is_missing_entry(&ConfigError::Keyring(keyring::Error::NoEntry)));
        assert!(!is_missing_entry(&ConfigError::Keyring(
            keyring::Error::PlatformFailure("locked".into())
        )));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let p = Profile {
            base_url: Some("not a url".into()),
            ..profile()
        };
        assert!(matches!(
            resolve_base_url(&p),
            Err(ConfigError::Validation { .. })
        ));
    }
}
