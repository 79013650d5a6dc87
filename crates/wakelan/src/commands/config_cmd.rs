//! Config subcommand handlers.

use dialoguer::{Input, Select};

use wakelan_config::BackendKind;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output::Printer;

use super::util::prompt_err;

fn detail(cfg: &Config) -> String {
    [
        format!("api_url:      {}", cfg.api_url),
        format!("timeout_ms:   {}", cfg.timeout_ms),
        format!("max_retries:  {}", cfg.max_retries),
        format!("debug:        {}", cfg.debug),
        format!("environment:  {}", cfg.environment),
        format!("app:          {} {}", cfg.app.title, cfg.app.version),
        format!(
            "credentials:  {} (profile '{}')",
            cfg.credentials.backend, cfg.credentials.profile
        ),
        format!(
            "defaults:     output={} color={}",
            cfg.defaults.output, cfg.defaults.color
        ),
    ]
    .join("\n")
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts, out: &Printer) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let path = config::active_path(global);
            // A broken file must not hide the settings in effect.
            let loaded = wakelan_config::load_config_from(&path).unwrap_or_else(|e| {
                out.warn(&format!(
                    "could not read {}: {e}; showing defaults",
                    path.display()
                ));
                Config::default()
            });
            let cfg = config::with_overrides(loaded, global);
            out.single(&cfg, detail, |c| c.api_url.clone())?;
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::active_path(global).display());
            Ok(())
        }

        ConfigCommand::Init => init(global),
    }
}

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::active_path(global);
    eprintln!("wakelan configuration wizard");
    eprintln!("   Config path: {}\n", path.display());

    let mut cfg = Config::default();

    cfg.api_url = Input::new()
        .with_prompt("Backend API URL")
        .default(cfg.api_url.clone())
        .interact_text()
        .map_err(prompt_err)?;

    cfg.timeout_ms = Input::new()
        .with_prompt("Request timeout (ms)")
        .default(cfg.timeout_ms)
        .interact_text()
        .map_err(prompt_err)?;

    let backends = [BackendKind::File, BackendKind::Keyring, BackendKind::Memory];
    let labels = [
        "File in the data directory",
        "System keyring",
        "Memory only (log in on every run)",
    ];
    let choice = Select::new()
        .with_prompt("Where should the session token be kept?")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    cfg.credentials.backend = backends.get(choice).copied().unwrap_or_default();

    // Validate before writing anything.
    cfg.transport_config()?;
    config::save_config_to(&cfg, &path)?;

    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("\n  Next: wakelan login");
    Ok(())
}
