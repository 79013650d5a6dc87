use thiserror::Error;

/// Message used when neither the server nor the transport supplied one.
pub const FALLBACK_MESSAGE: &str = "connection error";

/// Top-level error type for the `wakelan-api` crate.
///
/// Every variant's `Display` is already the normalized, human-readable
/// message: server-provided text first, then the transport's own message,
/// then [`FALLBACK_MESSAGE`]. `wakelan-core` maps these into domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The backend answered 401. The credential store has already been
    /// cleared by the time the caller sees this.
    #[error("{message}")]
    Unauthorized { message: String },

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-2xx response other than 401.
    #[error("{message}")]
    Http { status: u16, message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection refused, DNS failure, broken body stream, etc.
    #[error("{}", transport_message(.0))]
    Transport(#[source] reqwest::Error),

    /// Request exceeded the configured per-request timeout.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// A request path could not be joined onto the base URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("unexpected response: {message}")]
    Deserialization { message: String, body: String },
}

fn transport_message(err: &reqwest::Error) -> String {
    let text = err.to_string();
    if text.trim().is_empty() {
        FALLBACK_MESSAGE.to_owned()
    } else {
        text
    }
}

impl Error {
    /// The normalized message callers show to users.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Returns `true` if the backend rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns `true` for network-level failures (unreachable, timeout).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// HTTP status code, when the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for a 404 response.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Failure reported by a durable credential backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("credential storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_server_message() {
        let err = Error::Http {
            status: 400,
            message: "MAC address is required".into(),
        };
        assert_eq!(err.user_message(), "MAC address is required");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn unauthorized_reports_401() {
        let err = Error::Unauthorized {
            message: "Token expired".into(),
        };
        assert!(err.is_unauthorized());
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn timeout_is_transient() {
        assert!(Error::Timeout { timeout_secs: 10 }.is_transient());
    }
}
