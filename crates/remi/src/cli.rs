//! Clap derive structures for the `remi` CLI.
//!
//! Defines the complete command tree, global flags, and shared value
//! enums. Only depends on clap so build.rs can render man pages from it.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// remi -- control UrbanHello Remi clocks from the command line
#[derive(Debug, Parser)]
#[command(
    name = "remi",
    version,
    about = "Control UrbanHello Remi clocks from the command line",
    long_about = "Talks to the UrbanHello cloud the same way the mobile app does.\n\n\
        Log in once with `remi login`; the session, device and installation id\n\
        are kept in a named profile and reused by every other command.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "REMI_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "REMI_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "REMI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and bind a device to a profile
    Login(LoginArgs),

    /// Show sensors and settings of the device
    #[command(alias = "st")]
    Status,

    /// List clock faces
    Faces,

    /// Manage alarms
    #[command(alias = "a")]
    Alarms(AlarmsArgs),

    /// Change a device setting
    Set(SetArgs),

    /// Switch the night light or background colour
    Light(LightArgs),

    /// Poll the device and print changes as they happen
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOGIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account e-mail (prompted when omitted)
    #[arg(long, short = 'u', env = "REMI_USERNAME")]
    pub username: Option<String>,

    /// Device to bind when the account has several (prompted when omitted)
    #[arg(long)]
    pub device: Option<String>,

    /// Where to keep the password
    #[arg(long, default_value = "keyring")]
    pub store: PasswordStore,

    /// Parse API base URL (defaults to the UrbanHello cloud)
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum PasswordStore {
    /// System keyring
    Keyring,
    /// Plaintext in the config file
    Plaintext,
    /// Do not store; supply it via REMI_PASSWORD
    None,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALARMS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlarmsArgs {
    #[command(subcommand)]
    pub command: AlarmsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlarmsCommand {
    /// List alarms
    #[command(alias = "ls")]
    List,

    /// Show one alarm
    Get {
        /// Alarm ID
        id: String,
    },

    /// Create an alarm
    Create {
        /// Alarm name
        #[arg(long)]
        name: String,

        /// Alarm time (ISO-8601, passed through as a Parse date)
        #[arg(long)]
        time: String,

        /// Repeat days, 0 = Sunday .. 6 = Saturday (comma-separated)
        #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u8).range(0..=6))]
        repeat: Vec<u8>,

        /// Clock face shown while the alarm rings
        #[arg(long)]
        face: Option<FaceArg>,

        /// Alarm volume (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,

        /// Create the alarm switched off
        #[arg(long)]
        disabled: bool,
    },

    /// Update an alarm
    Update {
        /// Alarm ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        /// Alarm time (ISO-8601)
        #[arg(long)]
        time: Option<String>,

        /// Repeat days, 0 = Sunday .. 6 = Saturday (comma-separated)
        #[arg(long, value_delimiter = ',', value_parser = clap::value_parser!(u8).range(0..=6))]
        repeat: Option<Vec<u8>>,

        #[arg(long)]
        face: Option<FaceArg>,

        /// Alarm volume (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        volume: Option<u8>,
    },

    /// Delete an alarm
    #[command(alias = "rm")]
    Delete {
        /// Alarm ID
        id: String,
    },

    /// Switch an alarm on
    Enable {
        /// Alarm ID
        id: String,
    },

    /// Switch an alarm off
    Disable {
        /// Alarm ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SETTINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(subcommand)]
    pub command: SetCommand,
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Speaker volume (0-100)
    Volume {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: u8,
    },

    /// Screen brightness (0-100)
    Brightness {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: u8,
    },

    /// Noise alert threshold (0-100)
    NoiseThreshold {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        value: u8,
    },

    /// Clock face
    Face { face: FaceArg },

    /// 12- or 24-hour clock
    ClockFormat { format: ClockFormatArg },

    /// Music mode
    Music { mode: MusicModeArg },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FaceArg {
    Off,
    Awake,
    Sleepy,
    SemiAwake,
    Smiley,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ClockFormatArg {
    #[value(name = "12h")]
    H12,
    #[value(name = "24h")]
    H24,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MusicModeArg {
    Off,
    Music,
    WhiteNoise,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LIGHTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LightArgs {
    #[command(subcommand)]
    pub command: LightCommand,
}

#[derive(Debug, Subcommand)]
pub enum LightCommand {
    /// Switch a channel on
    On {
        channel: LightArg,

        /// Colour as `r,g,b` (keeps the current colour when omitted)
        #[arg(long)]
        rgb: Option<String>,
    },

    /// Switch a channel off
    Off { channel: LightArg },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LightArg {
    NightLight,
    Background,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Remove a profile and its stored password
    Remove {
        /// Profile name
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
