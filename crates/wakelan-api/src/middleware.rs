// Request/response middleware
//
// The transport runs an ordered list of request middleware before every
// send and an ordered list of response middleware after every exchange.
// The default chains are `[BearerAuth]` and
// `[TraceResponse, LogoutOnUnauthorized]`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use tracing::{debug, warn};
use url::Url;

use crate::credentials::CredentialStore;
use crate::error::Error;

/// Metadata about a finished request, handed to response middleware.
#[derive(Debug, Clone, Copy)]
pub struct Exchange<'a> {
    pub method: &'a Method,
    pub url: &'a Url,
    /// `None` when the request never produced a response.
    pub status: Option<StatusCode>,
    pub elapsed: Duration,
}

/// Runs before a request is sent and may rewrite it.
pub trait RequestMiddleware: Send + Sync {
    fn on_request(&self, request: &mut reqwest::Request);
}

/// Observes the outcome of a request.
///
/// Middleware cannot swallow failures: the transport re-raises the error
/// after every `on_failure` hook has run.
pub trait ResponseMiddleware: Send + Sync {
    fn on_success(&self, _exchange: &Exchange<'_>) {}

    fn on_failure(&self, _exchange: &Exchange<'_>, _error: &Error) {}
}

// ── BearerAuth ──────────────────────────────────────────────────────

/// Attaches `Authorization: Bearer <token>` when a token is stored.
pub struct BearerAuth {
    credentials: Arc<CredentialStore>,
}

impl BearerAuth {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self { credentials }
    }
}

impl RequestMiddleware for BearerAuth {
    fn on_request(&self, request: &mut reqwest::Request) {
        let Some(token) = self.credentials.token() else {
            return;
        };
        let token = token.expose_secret();
        if token.is_empty() {
            return;
        }

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => warn!(error = %e, "stored token is not a valid header value, sending unauthenticated"),
        }
    }
}

// ── TraceResponse ───────────────────────────────────────────────────

/// Logs every exchange at `debug`.
#[derive(Debug, Default)]
pub struct TraceResponse;

impl ResponseMiddleware for TraceResponse {
    fn on_success(&self, exchange: &Exchange<'_>) {
        debug!(
            method = %exchange.method,
            url = %exchange.url,
            status = exchange.status.map(|s| s.as_u16()),
            elapsed_ms = exchange.elapsed.as_millis(),
            "request completed"
        );
    }

    fn on_failure(&self, exchange: &Exchange<'_>, error: &Error) {
        debug!(
            method = %exchange.method,
            url = %exchange.url,
            status = exchange.status.map(|s| s.as_u16()),
            elapsed_ms = exchange.elapsed.as_millis(),
            error = %error,
            "request failed"
        );
    }
}

// ── LogoutOnUnauthorized ────────────────────────────────────────────

/// Clears the credential store whenever the backend answers 401,
/// whichever endpoint triggered it.
pub struct LogoutOnUnauthorized {
    credentials: Arc<CredentialStore>,
}

impl LogoutOnUnauthorized {
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self { credentials }
    }
}

impl ResponseMiddleware for LogoutOnUnauthorized {
    fn on_failure(&self, exchange: &Exchange<'_>, error: &Error) {
        if error.is_unauthorized() {
            warn!(url = %exchange.url, "backend rejected credentials, logging out");
            self.credentials.clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn request() -> reqwest::Request {
        reqwest::Request::new(
            Method::GET,
            Url::parse("http://localhost:5000/api/equipos").unwrap(),
        )
    }

    #[test]
    fn bearer_auth_skips_when_logged_out() {
        let creds = Arc::new(CredentialStore::in_memory());
        let mut req = request();
        BearerAuth::new(creds).on_request(&mut req);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn bearer_auth_attaches_sensitive_header() {
        let creds = Arc::new(CredentialStore::in_memory());
        creds.set_token(&SecretString::from("abc".to_owned()));
        let mut req = request();
        BearerAuth::new(creds).on_request(&mut req);
        let value = req.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer abc");
        assert!(value.is_sensitive());
    }

    #[test]
    fn logout_on_unauthorized_ignores_other_errors() {
        let creds = Arc::new(CredentialStore::in_memory());
        creds.set_token(&SecretString::from("abc".to_owned()));
        let mw = LogoutOnUnauthorized::new(Arc::clone(&creds));
        let url = Url::parse("http://localhost/api/equipos").unwrap();
        let exchange = Exchange {
            method: &Method::GET,
            url: &url,
            status: Some(StatusCode::FORBIDDEN),
            elapsed: Duration::ZERO,
        };

        mw.on_failure(
            &exchange,
            &Error::Http {
                status: 403,
                message: "forbidden".into(),
            },
        );
        assert!(creds.is_authenticated());

        mw.on_failure(
            &exchange,
            &Error::Unauthorized {
                message: "Token expired".into(),
            },
        );
        assert!(!creds.is_authenticated());
    }
}
