// Session manager
//
// Login, registration and logout on top of the credential store. Login
// and register each get their own facade so callers can show a spinner
// per action.

use secrecy::SecretString;
use tracing::{debug, info};
use wakelan_api::{ApiClient, Envelope, LoginCredentials, Permissions, UserProfile};

use crate::error::CoreError;

pub struct SessionManager {
    api: ApiClient,
    login_api: ApiClient,
    register_api: ApiClient,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        let login_api = api.fork();
        let register_api = api.fork();
        Self {
            api,
            login_api,
            register_api,
        }
    }

    /// Authenticate and store the returned token and profile.
    ///
    /// Returns `Ok(false)` when the backend answers without `success`, a
    /// token, or a user; the stored credentials are left as they were.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<bool, CoreError> {
        let res = self.login_api.login(credentials).await?;

        let (true, Some(token), Some(user)) = (res.is_success(), res.token, res.user) else {
            debug!(username = %credentials.username, "login rejected");
            return Ok(false);
        };

        let store = self.api.credentials();
        store.set_token(&token);
        store.set_user(&user);
        info!(username = %user.username, "logged in");
        Ok(true)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, credentials: &LoginCredentials) -> Result<bool, CoreError> {
        let res = self.register_api.register(credentials).await?;
        Ok(res.is_success())
    }

    /// Tell the backend, then forget the local session whatever happened.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            debug!(error = %e, "logout request failed, clearing local session anyway");
        }
        self.api.credentials().clear();
        info!("logged out");
    }

    /// Refresh the stored profile from `GET /me`.
    ///
    /// Returns the profile and permission flags the backend reported.
    pub async fn me(&self) -> Result<(Option<UserProfile>, Permissions), CoreError> {
        let res = self.api.me().await?;
        if let Some(user) = &res.user {
            self.api.credentials().set_user(user);
        }
        Ok((res.user, res.permissions.unwrap_or_default()))
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.credentials().is_authenticated()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.api.credentials().user()
    }

    pub fn token(&self) -> Option<SecretString> {
        self.api.credentials().token()
    }

    pub fn login_loading(&self) -> bool {
        self.login_api.loading()
    }

    pub fn register_loading(&self) -> bool {
        self.register_api.loading()
    }

    /// `true` while either login or registration is in flight.
    pub fn loading(&self) -> bool {
        self.login_loading() || self.register_loading()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
