// wakelan-api: Async Rust client for the Wake-on-LAN device backend
//
// Layers, leaves first: credentials → middleware → transport → facade.
// Endpoint methods are split by area into `auth`, `devices` and `admin`.

pub mod credentials;
pub mod envelope;
pub mod error;
pub mod facade;
pub mod middleware;
pub mod models;
pub mod transport;

mod admin;
mod auth;
mod devices;

pub use credentials::{Credential, CredentialBackend, CredentialStore, MemoryBackend};
pub use envelope::{
    AuthResult, DeviceListResult, DeviceResult, Envelope, GenericResult, MeResult, Permissions,
    StatusResult, UserListResult, UserResult,
};
pub use error::{Error, StoreError};
pub use facade::ApiClient;
pub use models::{
    CreateDevice, CreateUser, Device, DeviceId, DeviceState, LoginCredentials, Role,
    UpdateDevice, UserId, UserProfile,
};
pub use transport::{Transport, TransportBuilder, TransportConfig};
