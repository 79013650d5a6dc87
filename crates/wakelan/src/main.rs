mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use wakelan_core::AppContext;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;
use crate::output::Printer;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let debug = wakelan_config::load_config_from(&config::active_path(&cli.global))
        .is_ok_and(|cfg| cfg.debug);
    init_tracing(cli.global.verbose, debug);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, debug: bool) {
    let filter = match verbosity {
        0 if debug => "debug",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { global, command } = cli;

    match command {
        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "wakelan", &mut std::io::stdout());
            Ok(())
        }

        // Config commands must work even when the stored config is broken
        Command::Config(args) => {
            let cfg = wakelan_config::load_config_from(&config::active_path(&global))
                .unwrap_or_default();
            let out = printer(&global, &cfg)?;
            commands::config_cmd::handle(args, &global, &out)
        }

        cmd => {
            let cfg = config::resolve(&global)?;
            let out = printer(&global, &cfg)?;
            let ctx = AppContext::new(&cfg.transport_config()?, cfg.open_credential_store()?)?;

            tracing::debug!(command = ?cmd, api_url = %cfg.api_url, "dispatching command");
            let result = commands::dispatch(cmd, &ctx, &global, &out).await;

            out.notifications(&ctx.notifications().drain());
            result.map_err(|e| e.with_url(&cfg.api_url))
        }
    }
}

fn printer(global: &GlobalOpts, cfg: &config::Config) -> Result<Printer, CliError> {
    Ok(Printer::new(
        config::output_format(global, cfg)?,
        config::color_mode(global, cfg)?,
        global.quiet,
    ))
}
