// Credential store
//
// In-memory view of the bearer token and user profile, written through to
// a durable backend on every mutation. The transport reads the token for
// every request and clears it on a 401; session flows set it on login.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::models::UserProfile;

/// Durable entry holding the raw bearer token.
pub const TOKEN_KEY: &str = "auth_token";
/// Durable entry holding the JSON-serialized user profile.
pub const USER_KEY: &str = "user";

/// Durable string key-value storage behind a [`CredentialStore`].
///
/// Implementations must finish the write before returning. A missing entry
/// is `Ok(None)`, never an error.
pub trait CredentialBackend: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

impl<T: CredentialBackend + ?Sized> CredentialBackend for Box<T> {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Snapshot of the stored session.
#[derive(Debug, Clone, Default)]
pub struct Credential {
    pub token: Option<SecretString>,
    pub user: Option<UserProfile>,
}

impl Credential {
    pub fn is_authenticated(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|t| !t.expose_secret().is_empty())
    }
}

/// Token + profile store, one per process.
///
/// Token and user are written as two separate entries; a crash between
/// the writes can leave them out of step.
pub struct CredentialStore {
    state: RwLock<Credential>,
    backend: Box<dyn CredentialBackend>,
}

impl CredentialStore {
    /// Open the store, loading whatever the backend already holds.
    ///
    /// Read failures and a corrupt profile payload both yield `None`.
    pub fn open(backend: impl CredentialBackend + 'static) -> Self {
        let token = match backend.read(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()).map(SecretString::from),
            Err(e) => {
                warn!(error = %e, "failed to read stored token");
                None
            }
        };

        let user = match backend.read(USER_KEY) {
            Ok(Some(raw)) => parse_user(&raw),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "failed to read stored user profile");
                None
            }
        };

        debug!(authenticated = token.is_some(), "credential store opened");

        Self {
            state: RwLock::new(Credential { token, user }),
            backend: Box::new(backend),
        }
    }

    /// A store with no durable backing.
    pub fn in_memory() -> Self {
        Self::open(MemoryBackend::default())
    }

    pub fn get(&self) -> Credential {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<SecretString> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated()
    }

    pub fn set_token(&self, token: &SecretString) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .token = Some(token.clone());
        if let Err(e) = self.backend.write(TOKEN_KEY, token.expose_secret()) {
            warn!(error = %e, "failed to persist token");
        }
    }

    pub fn set_user(&self, user: &UserProfile) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .user = Some(user.clone());
        match serde_json::to_string(user) {
            Ok(raw) => {
                if let Err(e) = self.backend.write(USER_KEY, &raw) {
                    warn!(error = %e, "failed to persist user profile");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize user profile"),
        }
    }

    /// Drop both entries, in memory and on the backend.
    pub fn clear(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = Credential::default();
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.backend.remove(key) {
                warn!(error = %e, key, "failed to remove stored credential");
            }
        }
        debug!("credentials cleared");
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("state", &self.get())
            .finish_non_exhaustive()
    }
}

fn parse_user(raw: &str) -> Option<UserProfile> {
    if raw.trim().is_empty() || raw.trim() == "null" {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(error = %e, "ignoring corrupt stored user profile");
            None
        }
    }
}

// ── In-memory backend ───────────────────────────────────────────────

/// Volatile backend, used for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Seed the backend, e.g. to simulate a previous session.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl CredentialBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
