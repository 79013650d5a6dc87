// ── Core error types ──
//
// Domain errors for wakelan-core. The `From<wakelan_api::Error>` impl
// folds transport-layer failures into these variants; the normalized
// message from the API layer is carried through untouched.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the backend: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Not authenticated: {message}")]
    Unauthorized { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── API errors ───────────────────────────────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code, if the failure came from a response.
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// The bare message, without the variant's prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::ConnectionFailed { message }
            | Self::Unauthorized { message }
            | Self::Api { message, .. }
            | Self::Config { message } => message.clone(),
            Self::Validation { reason, .. } => reason.clone(),
            Self::Timeout { .. } | Self::NotFound { .. } => self.to_string(),
        }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wakelan_api::Error> for CoreError {
    fn from(err: wakelan_api::Error) -> Self {
        match err {
            wakelan_api::Error::Unauthorized { message } => CoreError::Unauthorized { message },
            wakelan_api::Error::Http { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            wakelan_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        message: err.user_message(),
                    }
                }
            }
            wakelan_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            wakelan_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid API URL: {e}"),
            },
            wakelan_api::Error::Client(message) => CoreError::Config { message },
            wakelan_api::Error::Deserialization { message, .. } => CoreError::Api {
                message,
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_keeps_status_and_message() {
        let err: CoreError = wakelan_api::Error::Http {
            status: 404,
            message: "Equipo no encontrado".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Api { status: Some(404), .. }));
        assert_eq!(err.user_message(), "Equipo no encontrado");
    }

    #[test]
    fn unauthorized_maps_through() {
        let err: CoreError = wakelan_api::Error::Unauthorized {
            message: "Token requerido".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Unauthorized { .. }));
    }

    #[test]
    fn validation_message_is_the_reason() {
        let err = CoreError::validation("username", "username is required");
        assert_eq!(err.user_message(), "username is required");
        assert_eq!(err.to_string(), "Invalid username: username is required");
    }
}
