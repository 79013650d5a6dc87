//! Shared configuration for the wakelan CLI.
//!
//! Layered loading (defaults → TOML file → `WAKELAN_*` environment),
//! the canonical file locations, and the durable credential backends in
//! [`store`]. The CLI adds flag overrides on top.

pub mod store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wakelan_core::{CredentialStore, TransportConfig};

pub use store::{FileBackend, KeyringBackend};

/// Prefix for environment overrides (`WAKELAN_API_URL`, ...). Nested keys
/// use a double underscore: `WAKELAN_CREDENTIALS__BACKEND=keyring`.
pub const ENV_PREFIX: &str = "WAKELAN_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no home or data directory could be determined")]
    NoDataDir,
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Backend base URL, including the `/api` prefix.
    pub api_url: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,

    /// Retry hint. Read and shown, but requests are never retried.
    pub max_retries: u32,

    /// Raise the default log level to `debug`.
    pub debug: bool,

    /// Free-form deployment name (`development`, `production`, ...).
    pub environment: String,

    pub app: AppInfo,

    pub credentials: CredentialSettings,

    pub defaults: Defaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: wakelan_core::DEFAULT_BASE_URL.into(),
            timeout_ms: 10_000,
            max_retries: 3,
            debug: false,
            environment: "development".into(),
            app: AppInfo::default(),
            credentials: CredentialSettings::default(),
            defaults: Defaults::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppInfo {
    pub title: String,
    pub version: String,
}

impl Default for AppInfo {
    fn default() -> Self {
        Self {
            title: "Wake-on-LAN Remote".into(),
            version: "1.0.0".into(),
        }
    }
}

/// Where the bearer token and user profile are kept between runs.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    /// Plain files under the platform data directory.
    #[default]
    File,
    /// The OS keyring.
    Keyring,
    /// Nothing persisted; every run starts logged out.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialSettings {
    pub backend: BackendKind,

    /// Separates stored sessions, e.g. one per backend.
    pub profile: String,
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::File,
            profile: "default".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Defaults {
    pub output: String,
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: "table".into(),
            color: "auto".into(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Transport settings for the configured backend.
    pub fn transport_config(&self) -> Result<TransportConfig, ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation {
                field: "timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        TransportConfig::new(&self.api_url, self.timeout()).map_err(|e| {
            ConfigError::Validation {
                field: "api_url".into(),
                reason: format!("{e} ({})", self.api_url),
            }
        })
    }

    /// Open the credential store selected by `credentials.backend`.
    pub fn open_credential_store(&self) -> Result<CredentialStore, ConfigError> {
        let profile = &self.credentials.profile;
        let store = match self.credentials.backend {
            BackendKind::File => CredentialStore::open(FileBackend::new(session_dir(profile)?)),
            BackendKind::Keyring => CredentialStore::open(KeyringBackend::new(profile)),
            BackendKind::Memory => CredentialStore::in_memory(),
        };
        debug!(backend = %self.credentials.backend, profile, "credential store ready");
        Ok(store)
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "wakelan", "wakelan")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
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
    p.push("wakelan");
    p
}

/// Directory holding the stored session for `profile`.
pub fn session_dir(profile: &str) -> Result<PathBuf, ConfigError> {
    let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
    Ok(dirs.data_dir().join("sessions").join(profile))
}

// ── Config loading ──────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file; a missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = figment_for(path).extract()?;
    Ok(config)
}

/// Load config, returning a default if anything goes wrong.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
