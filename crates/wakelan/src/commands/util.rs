//! Shared helpers for command handlers.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::Input;

use wakelan_core::AppContext;

use crate::error::CliError;

/// Fail early when a command needs a session and none is stored.
pub fn require_login(ctx: &AppContext) -> Result<(), CliError> {
    if ctx.credentials().is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// `--username` if given, else an interactive prompt.
pub fn username(flag: Option<String>) -> Result<String, CliError> {
    match flag {
        Some(name) => Ok(name),
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err),
    }
}

/// First line of stdin with `--password-stdin`, else a hidden prompt.
pub fn password(from_stdin: bool) -> Result<String, CliError> {
    if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_owned());
    }
    rpassword::prompt_password("Password: ").map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
