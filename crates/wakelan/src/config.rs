//! CLI configuration: `wakelan_config` plus flag overrides.
//!
//! Precedence, lowest first: built-in defaults, config file, `WAKELAN_*`
//! environment, command-line flags.

use std::path::PathBuf;

use wakelan_config::ConfigError;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use wakelan_config::{Config, config_path, save_config_to};

/// File the current invocation reads (`--config` or the default).
pub fn active_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load config for this invocation and apply the global flags on top.
pub fn resolve(global: &GlobalOpts) -> Result<Config, CliError> {
    let cfg = with_overrides(wakelan_config::load_config_from(&active_path(global))?, global);

    // Surface a bad URL or zero timeout before any command runs.
    cfg.transport_config()?;
    Ok(cfg)
}

/// Apply `--api-url`, `--timeout` and `--profile` to a loaded config.
pub fn with_overrides(mut cfg: Config, global: &GlobalOpts) -> Config {
    if let Some(ref url) = global.api_url {
        cfg.api_url.clone_from(url);
    }
    if let Some(ms) = global.timeout_ms {
        cfg.timeout_ms = ms;
    }
    if let Some(ref profile) = global.profile {
        cfg.credentials.profile.clone_from(profile);
    }
    cfg
}

/// `--output` if given, else `defaults.output` from config.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> Result<OutputFormat, CliError> {
    if let Some(format) = global.output {
        return Ok(format);
    }
    parse_choice("defaults.output", &cfg.defaults.output)
}

/// `--color` if given, else `defaults.color` from config.
pub fn color_mode(global: &GlobalOpts, cfg: &Config) -> Result<ColorMode, CliError> {
    if let Some(mode) = global.color {
        return Ok(mode);
    }
    parse_choice("defaults.color", &cfg.defaults.color)
}

fn parse_choice<T: clap::ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| {
        CliError::Config(ConfigError::Validation {
            field: field.into(),
            reason,
        })
    })
}
