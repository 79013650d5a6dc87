// Typed call facade
//
// Thin layer over the transport that tracks a `loading` flag and the last
// error message for whoever renders them. Endpoint methods live in
// `auth.rs`, `devices.rs` and `admin.rs` as inherent impls on `ApiClient`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::credentials::CredentialStore;
use crate::error::Error;
use crate::transport::Transport;

/// Async client for the device backend.
///
/// `loading` and `error` belong to this instance. Overlapping calls on
/// one instance race on them; use [`ApiClient::fork`] for isolated flags
/// over the same transport.
pub struct ApiClient {
    transport: Arc<Transport>,
    loading: AtomicBool,
    error: RwLock<Option<String>>,
}

impl ApiClient {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            loading: AtomicBool::new(false),
            error: RwLock::new(None),
        }
    }

    /// A new client sharing this one's transport but with its own flags.
    pub fn fork(&self) -> Self {
        Self::new(Arc::clone(&self.transport))
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        self.transport.credentials()
    }

    /// `true` while a call is in flight.
    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Normalized message from the most recent failed call, cleared when
    /// the next call starts.
    pub fn error(&self) -> Option<String> {
        self.error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, message: Option<String>) {
        *self.error.write().unwrap_or_else(PoisonError::into_inner) = message;
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// Issue one request through the transport and decode the envelope.
    pub async fn call<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        let _loading = LoadingGuard::engage(&self.loading);
        self.set_error(None);

        match self.transport.send(method, path, body).await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.set_error(Some(e.user_message()));
                Err(e)
            }
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.call::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.call(Method::POST, path, Some(body)).await
    }

    /// POST without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.call::<T, ()>(Method::POST, path, None).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized + Sync,
    {
        self.call(Method::PUT, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.call::<T, ()>(Method::DELETE, path, None).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("transport", &self.transport)
            .field("loading", &self.loading())
            .field("error", &self.error())
            .finish()
    }
}

/// Sets the flag on creation and clears it on drop, so early returns and
/// panics both release it.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn engage(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
