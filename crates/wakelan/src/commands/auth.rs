//! Session command handlers: login, register, logout, whoami.

use serde::Serialize;

use wakelan_core::{AppContext, LoginOutcome, Permissions, UserProfile};

use crate::cli::CredentialArgs;
use crate::error::{CliError, exit_code};
use crate::output::Printer;

use super::util;

#[derive(Serialize)]
struct WhoAmI {
    user: Option<UserProfile>,
    permissions: Permissions,
}

fn detail(w: &WhoAmI) -> String {
    let yes_no = |b: bool| if b { "yes" } else { "no" };
    let mut lines = match w.user {
        Some(ref u) => vec![
            format!("ID:       {}", u.id),
            format!("Username: {}", u.username),
            format!("Role:     {}", u.role.as_deref().unwrap_or("-")),
        ],
        None => vec!["Username: -".to_owned()],
    };
    if let Some(count) = w.user.as_ref().and_then(|u| u.equipos_count) {
        lines.push(format!("Devices:  {count}"));
    }
    lines.push(format!("Admin:    {}", yes_no(w.permissions.is_admin)));
    lines.push(format!(
        "Can add devices:  {}",
        yes_no(w.permissions.can_create_equipos)
    ));
    lines.push(format!(
        "Can manage users: {}",
        yes_no(w.permissions.can_manage_users)
    ));
    lines.join("\n")
}

pub async fn login(ctx: &AppContext, args: CredentialArgs) -> Result<(), CliError> {
    let mut form = ctx.login_form();
    form.username = util::username(args.username)?;
    form.password = util::password(args.password_stdin)?;
    form.validate()?;

    match form.submit().await {
        LoginOutcome::LoggedIn => Ok(()),
        LoginOutcome::Rejected => Err(CliError::failed("Login", exit_code::AUTH)),
        LoginOutcome::Invalid => Err(CliError::failed("Login", exit_code::USAGE)),
        LoginOutcome::Failed => Err(CliError::failed("Login", exit_code::CONNECTION)),
        LoginOutcome::Registered | LoginOutcome::RegistrationRefused => {
            Err(CliError::failed("Login", exit_code::GENERAL))
        }
    }
}

pub async fn register(ctx: &AppContext, args: CredentialArgs) -> Result<(), CliError> {
    let mut form = ctx.login_form();
    form.toggle_mode();
    form.username = util::username(args.username)?;
    form.password = util::password(args.password_stdin)?;
    form.validate()?;

    match form.submit().await {
        LoginOutcome::Registered => Ok(()),
        LoginOutcome::Invalid => Err(CliError::failed("Registration", exit_code::USAGE)),
        LoginOutcome::Failed => Err(CliError::failed("Registration", exit_code::CONNECTION)),
        LoginOutcome::RegistrationRefused
        | LoginOutcome::LoggedIn
        | LoginOutcome::Rejected => Err(CliError::rejected(
            "Registration",
            "the backend did not accept the account",
        )),
    }
}

pub async fn logout(ctx: &AppContext, out: &Printer) {
    let was_logged_in = ctx.credentials().is_authenticated();
    ctx.session().logout().await;
    if was_logged_in {
        out.note("Logged out");
    } else {
        out.note("No session was stored");
    }
}

pub async fn whoami(ctx: &AppContext, out: &Printer) -> Result<(), CliError> {
    util::require_login(ctx)?;
    let (user, permissions) = ctx.session().me().await?;
    let view = WhoAmI { user, permissions };
    out.single(&view, detail, |w| {
        w.user
            .as_ref()
            .map_or_else(String::new, |u| u.username.clone())
    })?;
    Ok(())
}
