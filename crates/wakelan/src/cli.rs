//! Clap derive structures for the `wakelan` CLI.
//!
//! Also compiled by `build.rs` for man pages, so nothing here may depend
//! on crates outside clap and clap_complete.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wakelan -- wake and manage machines through a Wake-on-LAN backend
#[derive(Debug, Parser)]
#[command(
    name = "wakelan",
    version,
    about = "Wake and manage Wake-on-LAN devices from the command line",
    long_about = "Client for a Wake-on-LAN backend.\n\n\
        Log in once; the session token is stored and reused by later\n\
        commands until you log out or the backend rejects it.",
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
    /// Backend API URL, including the /api prefix (overrides config)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Request timeout in milliseconds (overrides config)
    #[arg(long = "timeout", global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Config file to read instead of the default location
    #[arg(long, env = "WAKELAN_CONFIG", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Credential profile (separates stored sessions)
    #[arg(long, short = 'p', global = true)]
    pub profile: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
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
    /// Log in and store the session token
    Login(CredentialArgs),

    /// Create an account (does not log in)
    Register(CredentialArgs),

    /// End the session and forget the stored token
    Logout,

    /// Show the logged-in user and their permissions
    Whoami,

    /// Check that the backend is up (no login needed)
    Status,

    /// Manage devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Send a Wake-on-LAN packet to a device
    Wake {
        /// Device ID
        id: u64,
    },

    /// User management and device assignment (admin only)
    Admin(AdminArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CredentialArgs {
    /// Username (prompted when omitted)
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Read the password from stdin instead of prompting
    #[arg(long)]
    pub password_stdin: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List your devices
    #[command(alias = "ls")]
    List,

    /// Show one device
    Get {
        /// Device ID
        id: u64,
    },

    /// Register a new device
    Add {
        /// Display name
        name: String,

        /// MAC address (any separator; normalized to AA:BB:CC:DD:EE:FF)
        #[arg(long, short = 'm')]
        mac: String,

        /// IPv4 address
        #[arg(long)]
        ip: Option<String>,

        /// Free-form description
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// Change a device; omitted fields keep their current value
    Edit {
        /// Device ID
        id: u64,

        /// New display name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// New MAC address
        #[arg(long, short = 'm')]
        mac: Option<String>,

        /// New IPv4 address ("" clears it)
        #[arg(long)]
        ip: Option<String>,

        /// New description ("" clears it)
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// Delete a device
    #[command(alias = "rm")]
    Remove {
        /// Device ID
        id: u64,
    },

    /// Power on a device through its own endpoint
    Wake {
        /// Device ID
        id: u64,
    },

    /// Probe a device's power state
    State {
        /// Device ID
        id: u64,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ADMIN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCommand,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List all users
    Users,

    /// Create a user
    CreateUser {
        /// Username
        username: String,

        /// Role for the new user
        #[arg(long, value_enum)]
        role: Option<RoleArg>,

        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },

    /// Give a user access to a device
    Assign {
        /// User ID
        user_id: u64,
        /// Device ID
        device_id: u64,
    },

    /// Take a device away from a user
    Unassign {
        /// User ID
        user_id: u64,
        /// Device ID
        device_id: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    User,
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
    /// Display the resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Create the config file with guided setup
    Init,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
