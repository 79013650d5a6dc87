//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use wakelan_config::ConfigError;
use wakelan_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(wakelan::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}\n\
             Try: wakelan status --api-url <URL>"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(wakelan::timeout),
        help("Increase the timeout with --timeout <MS> or check the backend.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(code(wakelan::not_logged_in), help("Run: wakelan login"))]
    NotLoggedIn,

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(wakelan::auth_failed),
        help("The stored session was cleared. Run: wakelan login")
    )]
    AuthFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wakelan::not_found),
        help("Run: wakelan {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{action} failed: {message}")]
    #[diagnostic(code(wakelan::rejected))]
    Rejected {
        action: String,
        message: String,
        /// HTTP status, when the backend answered with an error status.
        status: Option<u16>,
    },

    /// Details were already shown as notifications.
    #[error("{action} failed")]
    #[diagnostic(code(wakelan::failed))]
    Failed { action: String, exit: i32 },

    // ── Output ───────────────────────────────────────────────────────
    #[error("Could not render {format} output: {message}")]
    #[diagnostic(
        code(wakelan::render),
        help("Try another format with --output table")
    )]
    Render { format: &'static str, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wakelan::validation))]
    Validation { field: String, reason: String },

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wakelan::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(wakelan::config),
        help("Inspect the file with: wakelan config show")
    )]
    Config(#[from] ConfigError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotLoggedIn | Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. }
            | Self::Rejected {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Failed { exit, .. } => *exit,
            Self::Rejected { .. } | Self::Render { .. } | Self::Config(_) | Self::Io(_) => {
                exit_code::GENERAL
            }
        }
    }

    pub fn rejected(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            action: action.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn failed(action: impl Into<String>, exit: i32) -> Self {
        Self::Failed {
            action: action.into(),
            exit,
        }
    }

    /// Fill in the backend URL on connection failures.
    pub fn with_url(self, api_url: &str) -> Self {
        match self {
            Self::ConnectionFailed { reason, .. } => Self::ConnectionFailed {
                url: api_url.to_owned(),
                reason,
            },
            other => other,
        }
    }

    pub fn device_not_found(id: u64) -> Self {
        Self::NotFound {
            resource_type: "device".into(),
            identifier: id.to_string(),
            list_command: "devices list".into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { message } => CliError::ConnectionFailed {
                url: String::new(),
                reason: message,
            },
            CoreError::Timeout { .. } => CliError::Timeout,
            CoreError::Unauthorized { message } => CliError::AuthFailed { message },
            CoreError::NotFound { entity, identifier } => CliError::NotFound {
                list_command: format!("{entity}s list"),
                resource_type: entity,
                identifier,
            },
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },
            CoreError::Api { message, status } => CliError::Rejected {
                action: "Request".into(),
                message,
                status,
            },
            CoreError::Config { message } => CliError::Validation {
                field: "api_url".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    message: "connection error".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout { timeout_secs: 10 }, exit_code::TIMEOUT),
            (
                CoreError::Unauthorized {
                    message: "Token requerido".into(),
                },
                exit_code::AUTH,
            ),
            (CoreError::not_found("device", "7"), exit_code::NOT_FOUND),
            (
                CoreError::Api {
                    message: "Equipo no encontrado".into(),
                    status: Some(404),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::Api {
                    message: "boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
            (CoreError::validation("mac", "bad"), exit_code::USAGE),
        ];

        for (core, expected) in cases {
            assert_eq!(CliError::from(core).exit_code(), expected);
        }
    }
}
