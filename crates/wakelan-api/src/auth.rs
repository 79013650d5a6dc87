// Authentication endpoints
//
// Raw envelopes only. Storing the token and profile after a successful
// login is the session manager's job.

use tracing::debug;

use crate::envelope::{AuthResult, GenericResult, MeResult, StatusResult};
use crate::error::Error;
use crate::facade::ApiClient;
use crate::models::LoginCredentials;

impl ApiClient {
    /// `POST /auth/login`
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<AuthResult, Error> {
        debug!(username = %credentials.username, "logging in");
        self.post("auth/login", credentials).await
    }

    /// `POST /auth/register`
    pub async fn register(&self, credentials: &LoginCredentials) -> Result<AuthResult, Error> {
        debug!(username = %credentials.username, "registering account");
        self.post("auth/register", credentials).await
    }

    /// `POST /auth/logout`
    pub async fn logout(&self) -> Result<GenericResult, Error> {
        self.post_empty("auth/logout").await
    }

    /// Profile and permission flags of the current token.
    ///
    /// `GET /me`
    pub async fn me(&self) -> Result<MeResult, Error> {
        self.get("me").await
    }

    /// Unauthenticated health probe listing the backend's endpoints.
    ///
    /// `GET /status`
    pub async fn server_status(&self) -> Result<StatusResult, Error> {
        self.get("status").await
    }
}
