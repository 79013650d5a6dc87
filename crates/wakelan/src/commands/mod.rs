//! Command dispatch: bridges CLI args -> core managers -> output formatting.

pub mod admin;
pub mod auth;
pub mod config_cmd;
pub mod devices;
pub mod util;

use wakelan_core::AppContext;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output::Printer;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    ctx: &AppContext,
    global: &GlobalOpts,
    out: &Printer,
) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args).await,
        Command::Register(args) => auth::register(ctx, args).await,
        Command::Logout => {
            auth::logout(ctx, out).await;
            Ok(())
        }
        Command::Whoami => auth::whoami(ctx, out).await,
        Command::Status => admin::status(ctx, out).await,
        Command::Devices(args) => devices::handle(ctx, args, global, out).await,
        Command::Wake { id } => devices::wake(ctx, id).await,
        Command::Admin(args) => admin::handle(ctx, args, out).await,
        // Config and Completions are handled before a context exists
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
