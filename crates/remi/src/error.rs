//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use remi_config::ConfigError;
use remi_core::{CoreError, SetupFailure};

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the Remi cloud at {url}")]
    #[diagnostic(
        code(remi::connection_failed),
        help("Check your network connection.\nDetails: {reason}")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Cannot connect to the Remi cloud")]
    #[diagnostic(
        code(remi::cannot_connect),
        help("The service did not answer as expected: {message}\nTry again later.")
    )]
    CannotConnect { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Invalid username or password")]
    #[diagnostic(
        code(remi::invalid_auth),
        help("Check the account you use in the Remi app and run: remi login")
    )]
    InvalidAuth,

    #[error("Authentication failed for profile '{profile}'")]
    #[diagnostic(
        code(remi::auth_failed),
        help(
            "The stored password was rejected.\n\
             Run: remi config set-password --profile {profile}"
        )
    )]
    AuthFailed { profile: String },

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(remi::no_credentials),
        help("Run: remi config set-password, or set REMI_PASSWORD.")
    )]
    NoCredentials { profile: String },

    #[error("Unexpected error during login")]
    #[diagnostic(code(remi::unknown), help("Re-run with -vv for details."))]
    UnknownSetupError,

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(remi::not_found),
        help("Run: remi {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Device '{remi_id}' is already configured as profile '{profile}'")]
    #[diagnostic(
        code(remi::already_configured),
        help("Use --profile {profile}, or remove it with: remi config remove {profile}")
    )]
    AlreadyConfigured { remi_id: String, profile: String },

    #[error("No device data available")]
    #[diagnostic(
        code(remi::not_ready),
        help("The first poll of the device failed. Re-run with -v for details.")
    )]
    NotReady,

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error{}: {message}", http_suffix(.status))]
    #[diagnostic(code(remi::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(remi::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(remi::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: remi login --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(remi::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Confirmation required: {action}")]
    #[diagnostic(
        code(remi::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(remi::timeout),
        help("Increase the timeout with --timeout or try again later.")
    )]
    Timeout,

    // ── IO / Internal ────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(remi::internal))]
    Internal(String),
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::CannotConnect { .. } => exit_code::CONNECTION,
            Self::InvalidAuth | Self::AuthFailed { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::AlreadyConfigured { .. } => exit_code::CONFLICT,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Present a failure of the interactive login flow.
    pub fn from_setup(err: &CoreError) -> Self {
        match err.setup_failure() {
            SetupFailure::InvalidAuth => Self::InvalidAuth,
            SetupFailure::CannotConnect => Self::CannotConnect {
                message: err.to_string(),
            },
            SetupFailure::Unknown => {
                tracing::error!(error = %err, "unexpected error during login");
                Self::UnknownSetupError
            }
        }
    }

    /// Authentication failures name the profile whose password failed.
    pub fn with_profile(self, profile: &str) -> Self {
        match self {
            Self::AuthFailed { .. } => Self::AuthFailed {
                profile: profile.into(),
            },
            other => other,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message: _ } => CliError::AuthFailed {
                profile: "current".into(),
            },

            CoreError::Timeout => CliError::Timeout,

            CoreError::NotFound { message } => CliError::NotFound {
                resource_type: "object".into(),
                identifier: message,
                list_command: "status".into(),
            },

            CoreError::NotReady => CliError::NotReady,

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
