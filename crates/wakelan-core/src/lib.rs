//! Client-side logic between `wakelan-api` and front ends (CLI).
//!
//! - **[`AppContext`]** owns the credential store, transport and
//!   [`NotificationBus`] and builds the managers below.
//! - **[`SessionManager`]** logs in, registers and logs out.
//! - **[`DeviceManager`]** keeps a local device list in step with the
//!   backend (CRUD, wake, status probes).
//! - **[`AdminManager`]** covers user management and device assignment.
//! - **Forms** ([`forms`]) validate input and turn outcomes into
//!   notifications.
//! - **[`validate`]** holds the MAC/IP helpers.

pub mod admin;
pub mod context;
pub mod devices;
pub mod error;
pub mod forms;
pub mod notify;
pub mod session;
pub mod validate;

// ── Primary re-exports ──────────────────────────────────────────────
pub use admin::AdminManager;
pub use context::AppContext;
pub use devices::DeviceManager;
pub use error::CoreError;
pub use forms::{CardWake, DeviceCard, DeviceEditForm, LoginForm, LoginOutcome};
pub use notify::{NewNotification, Notification, NotificationBus, NotificationKind};
pub use session::SessionManager;

pub use wakelan_api::credentials::{TOKEN_KEY, USER_KEY};
pub use wakelan_api::transport::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use wakelan_api::{
    CreateDevice, Credential, CredentialBackend, CredentialStore, Device, DeviceId, DeviceState,
    LoginCredentials, MemoryBackend, Permissions, Role, StatusResult, StoreError, TransportConfig,
    UpdateDevice, UserId, UserProfile,
};
