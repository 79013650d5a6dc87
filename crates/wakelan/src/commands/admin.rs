//! Admin and server status handlers.

use serde::Serialize;
use tabled::Tabled;

use wakelan_core::{AppContext, Role, StatusResult, UserProfile};

use crate::cli::{AdminArgs, AdminCommand, RoleArg};
use crate::error::CliError;
use crate::output::Printer;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "Devices")]
    devices: String,
}

impl From<&UserProfile> for UserRow {
    fn from(u: &UserProfile) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            role: u.role.clone().unwrap_or_default(),
            devices: u.equipos_count.map(|c| c.to_string()).unwrap_or_default(),
        }
    }
}

fn user_detail(u: &UserProfile) -> String {
    [
        format!("ID:       {}", u.id),
        format!("Username: {}", u.username),
        format!("Role:     {}", u.role.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

#[derive(Serialize)]
struct ServerStatus {
    version: Option<String>,
    message: Option<String>,
    endpoints: Vec<String>,
}

impl From<StatusResult> for ServerStatus {
    fn from(s: StatusResult) -> Self {
        Self {
            version: s.version,
            message: s.message,
            endpoints: s.endpoints.into_values().flatten().collect(),
        }
    }
}

fn status_detail(s: &ServerStatus) -> String {
    let mut lines = vec![
        format!("Status:    {}", s.message.as_deref().unwrap_or("up")),
        format!("Version:   {}", s.version.as_deref().unwrap_or("-")),
    ];
    if !s.endpoints.is_empty() {
        lines.push("Endpoints:".to_owned());
        lines.extend(s.endpoints.iter().map(|e| format!("  {e}")));
    }
    lines.join("\n")
}

fn role(arg: RoleArg) -> Role {
    match arg {
        RoleArg::Admin => Role::Admin,
        RoleArg::User => Role::User,
    }
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(ctx: &AppContext, args: AdminArgs, out: &Printer) -> Result<(), CliError> {
    util::require_login(ctx)?;
    let admin = ctx.admin();

    match args.command {
        AdminCommand::Users => {
            let users = admin.list_users().await?;
            out.list(&users, |u| UserRow::from(u), |u| u.id.to_string())?;
            Ok(())
        }

        AdminCommand::CreateUser {
            username,
            role: role_arg,
            password_stdin,
        } => {
            let password = util::password(password_stdin)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            let user = admin
                .create_user(&username, &password, role_arg.map(role))
                .await?;
            out.single(&user, user_detail, |u| u.id.to_string())?;
            Ok(())
        }

        AdminCommand::Assign { user_id, device_id } => {
            let message = admin.assign(user_id, device_id).await?;
            out.note(&message);
            Ok(())
        }

        AdminCommand::Unassign { user_id, device_id } => {
            let message = admin.unassign(user_id, device_id).await?;
            out.note(&message);
            Ok(())
        }
    }
}

pub async fn status(ctx: &AppContext, out: &Printer) -> Result<(), CliError> {
    let status = ServerStatus::from(ctx.admin().server_status().await?);
    out.single(&status, status_detail, |s| {
        s.version.clone().unwrap_or_default()
    })?;
    Ok(())
}
