//! Device command handlers.

use tabled::Tabled;

use wakelan_core::forms::{status_icon, status_label};
use wakelan_core::validate::{format_mac, validate_ip, validate_mac};
use wakelan_core::{AppContext, CardWake, CreateDevice, Device, DeviceId};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::{CliError, exit_code};
use crate::output::Printer;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: DeviceId,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "State")]
    state: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            id: d.id,
            name: d.name.clone(),
            mac: d.mac_address.clone(),
            ip: d.ip_address.clone().unwrap_or_default(),
            state: format!("{} {}", status_icon(d.state), status_label(d.state)),
        }
    }
}

fn detail(d: &Device) -> String {
    [
        format!("ID:          {}", d.id),
        format!("Name:        {}", d.name),
        format!("Description: {}", d.description.as_deref().unwrap_or("-")),
        format!("MAC:         {}", d.mac_address),
        format!("IP:          {}", d.ip_address.as_deref().unwrap_or("-")),
        format!("State:       {} {}", status_icon(d.state), status_label(d.state)),
    ]
    .join("\n")
}

// ── Input checks ────────────────────────────────────────────────────

/// Normalize a MAC and insist on the full six-pair form.
fn checked_mac(input: &str) -> Result<String, CliError> {
    let mac = format_mac(input);
    if validate_mac(&mac) {
        Ok(mac)
    } else {
        Err(CliError::Validation {
            field: "mac".into(),
            reason: format!("'{input}' is not a MAC address (expected AA:BB:CC:DD:EE:FF)"),
        })
    }
}

fn checked_ip(input: &str) -> Result<(), CliError> {
    if validate_ip(input) {
        Ok(())
    } else {
        Err(CliError::Validation {
            field: "ip".into(),
            reason: format!("'{input}' is not an IPv4 address"),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    ctx: &AppContext,
    args: DevicesArgs,
    global: &GlobalOpts,
    out: &Printer,
) -> Result<(), CliError> {
    util::require_login(ctx)?;
    let manager = ctx.devices();

    match args.command {
        DevicesCommand::List => {
            let devices = manager.fetch_all().await?;
            out.list(&devices, |d| DeviceRow::from(d), |d| d.id.to_string())?;
            Ok(())
        }

        DevicesCommand::Get { id } => {
            let device = manager
                .fetch_one(id)
                .await?
                .ok_or_else(|| CliError::device_not_found(id))?;
            out.single(&device, detail, |d| d.id.to_string())?;
            Ok(())
        }

        DevicesCommand::Add {
            name,
            mac,
            ip,
            description,
        } => {
            if name.trim().is_empty() {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: "name cannot be empty".into(),
                });
            }
            let mac_address = checked_mac(&mac)?;
            let ip_address = non_blank(ip);
            if let Some(ref ip) = ip_address {
                checked_ip(ip)?;
            }

            let body = CreateDevice {
                name: name.trim().to_owned(),
                description: non_blank(description),
                mac_address,
                ip_address,
            };
            if !manager.create(&body).await? {
                return Err(CliError::rejected(
                    "Create device",
                    "the backend did not accept the device",
                ));
            }

            let created = manager
                .devices()
                .into_iter()
                .rev()
                .find(|d| d.mac_address.eq_ignore_ascii_case(&body.mac_address));
            match created {
                Some(d) => out.single(&d, detail, |d| d.id.to_string())?,
                None => out.note(&format!("Device '{}' created", body.name)),
            }
            Ok(())
        }

        DevicesCommand::Edit {
            id,
            name,
            mac,
            ip,
            description,
        } => {
            let current = manager
                .fetch_one(id)
                .await?
                .ok_or_else(|| CliError::device_not_found(id))?;

            let mut form = ctx.device_edit_form();
            form.load(&current);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(mac) = mac {
                form.mac_address = checked_mac(&mac)?;
            }
            if let Some(ip) = ip {
                checked_ip(&ip)?;
                form.ip_address = ip;
            }
            if let Some(description) = description {
                form.description = description;
            }

            if !form.is_valid() {
                return Err(CliError::Validation {
                    field: "device".into(),
                    reason: "name is required and the MAC must be complete".into(),
                });
            }
            if form.submit().await {
                Ok(())
            } else {
                Err(CliError::failed("Update", exit_code::GENERAL))
            }
        }

        DevicesCommand::Remove { id } => {
            if !util::confirm(&format!("Delete device {id}?"), global.yes, "devices remove")? {
                return Ok(());
            }
            if !manager.delete(id).await? {
                return Err(CliError::rejected(
                    "Delete device",
                    "the backend refused to delete it",
                ));
            }
            out.note(&format!("Device {id} deleted"));
            Ok(())
        }

        DevicesCommand::Wake { id } => {
            if !manager.wake(id).await? {
                return Err(CliError::rejected("Wake", "the backend refused the request"));
            }
            out.note(&format!("Wake-on-LAN packet sent to device {id}"));
            Ok(())
        }

        DevicesCommand::State { id } => {
            let device = manager
                .status(id)
                .await?
                .ok_or_else(|| CliError::device_not_found(id))?;
            out.single(&device, detail, |d| status_label(d.state).to_lowercase())?;
            Ok(())
        }
    }
}

/// `wakelan wake <id>`: the device-card flow.
pub async fn wake(ctx: &AppContext, id: DeviceId) -> Result<(), CliError> {
    util::require_login(ctx)?;
    let device = ctx
        .devices()
        .fetch_one(id)
        .await?
        .ok_or_else(|| CliError::device_not_found(id))?;

    match ctx.device_card(device).wake().await {
        CardWake::Sent | CardWake::Ignored => Ok(()),
        CardWake::Refused => Err(CliError::failed("Wake", exit_code::GENERAL)),
        CardWake::Failed => Err(CliError::failed("Wake", exit_code::CONNECTION)),
    }
}
