// HTTP transport
//
// One configured reqwest::Client plus the middleware chains. Every call in
// the crate funnels through `Transport::send`, which attaches credentials,
// normalizes failures, and decodes the success body.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::credentials::CredentialStore;
use crate::error::Error;
use crate::middleware::{
    BearerAuth, Exchange, LogoutOnUnauthorized, RequestMiddleware, ResponseMiddleware,
    TraceResponse,
};

/// Backend base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Per-request timeout used when nothing is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

const BODY_PREVIEW_LEN: usize = 200;

// ── Configuration ───────────────────────────────────────────────────

/// Settings for building the underlying HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl TransportConfig {
    /// Config for `base_url` with the given timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            timeout,
            user_agent: default_user_agent(),
        })
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| Error::Client(e.to_string()))
    }
}

fn default_user_agent() -> String {
    format!("wakelan/{}", env!("CARGO_PKG_VERSION"))
}

/// Force a trailing slash so relative joins keep the path prefix
/// (`http://host/api` + `equipos` → `http://host/api/equipos`).
fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw.trim())?;
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    Ok(url)
}

// ── Transport ───────────────────────────────────────────────────────

/// Shared HTTP transport. Build one per process and hand out `Arc`s.
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    credentials: Arc<CredentialStore>,
    request_chain: Vec<Arc<dyn RequestMiddleware>>,
    response_chain: Vec<Arc<dyn ResponseMiddleware>>,
}

impl Transport {
    /// Transport with the default middleware chains.
    pub fn new(config: &TransportConfig, credentials: Arc<CredentialStore>) -> Result<Self, Error> {
        Self::builder(config.clone(), credentials).build()
    }

    pub fn builder(config: TransportConfig, credentials: Arc<CredentialStore>) -> TransportBuilder {
        TransportBuilder {
            config,
            credentials,
            http: None,
            extra_request: Vec::new(),
            extra_response: Vec::new(),
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Join a request path onto the base URL. Leading slashes are ignored
    /// so `/equipos` and `equipos` resolve identically.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send one request and decode the JSON success body into `T`.
    pub async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder.build().map_err(Error::Transport)?;

        for middleware in &self.request_chain {
            middleware.on_request(&mut request);
        }

        let started = Instant::now();
        let outcome = self.exchange(request).await;

        let status = match &outcome {
            Ok((status, _)) => Some(*status),
            Err((status, _)) => *status,
        };
        let exchange = Exchange {
            method: &method,
            url: &url,
            status,
            elapsed: started.elapsed(),
        };

        match outcome {
            Ok((_, body)) => {
                for middleware in &self.response_chain {
                    middleware.on_success(&exchange);
                }
                decode(&body)
            }
            Err((_, err)) => {
                for middleware in &self.response_chain {
                    middleware.on_failure(&exchange, &err);
                }
                Err(err)
            }
        }
    }

    /// Perform the round trip, returning the success body or a normalized
    /// error together with whatever status the server sent.
    async fn exchange(
        &self,
        request: reqwest::Request,
    ) -> Result<(StatusCode, String), (Option<StatusCode>, Error)> {
        let resp = self
            .http
            .execute(request)
            .await
            .map_err(|e| (None, self.map_send_error(e)))?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err((Some(status), error_from_response(status, &raw)));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| (Some(status), self.map_send_error(e)))?;
        Ok((status, body))
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("request_chain", &self.request_chain.len())
            .field("response_chain", &self.response_chain.len())
            .finish_non_exhaustive()
    }
}

// ── Builder ─────────────────────────────────────────────────────────

/// Builder for a [`Transport`] with extra middleware.
///
/// Appended middleware runs after the default chain entries.
pub struct TransportBuilder {
    config: TransportConfig,
    credentials: Arc<CredentialStore>,
    http: Option<reqwest::Client>,
    extra_request: Vec<Arc<dyn RequestMiddleware>>,
    extra_response: Vec<Arc<dyn ResponseMiddleware>>,
}

impl TransportBuilder {
    /// Use an existing client instead of building one from the config.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    #[must_use]
    pub fn request_middleware(mut self, middleware: impl RequestMiddleware + 'static) -> Self {
        self.extra_request.push(Arc::new(middleware));
        self
    }

    #[must_use]
    pub fn response_middleware(mut self, middleware: impl ResponseMiddleware + 'static) -> Self {
        self.extra_response.push(Arc::new(middleware));
        self
    }

    pub fn build(self) -> Result<Transport, Error> {
        let http = match self.http {
            Some(http) => http,
            None => self.config.build_client()?,
        };

        let mut request_chain: Vec<Arc<dyn RequestMiddleware>> =
            vec![Arc::new(BearerAuth::new(Arc::clone(&self.credentials)))];
        request_chain.extend(self.extra_request);

        let mut response_chain: Vec<Arc<dyn ResponseMiddleware>> = vec![
            Arc::new(TraceResponse),
            Arc::new(LogoutOnUnauthorized::new(Arc::clone(&self.credentials))),
        ];
        response_chain.extend(self.extra_response);

        Ok(Transport {
            http,
            base_url: self.config.base_url,
            timeout: self.config.timeout,
            credentials: self.credentials,
            request_chain,
            response_chain,
        })
    }
}

// ── Response handling ───────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

fn error_from_response(status: StatusCode, raw: &str) -> Error {
    let message = serde_json::from_str::<ErrorBody>(raw)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("request failed with status code {}", status.as_u16()));

    if status == StatusCode::UNAUTHORIZED {
        Error::Unauthorized { message }
    } else {
        Error::Http {
            status: status.as_u16(),
            message,
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(BODY_PREVIEW_LEN).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })
}
