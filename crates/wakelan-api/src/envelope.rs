// Response envelopes
//
// The backend wraps every payload in one polymorphic JSON object
// (`success`, `message`, plus resource keys such as `token`, `equipos`,
// `equipo`). Each endpoint category decodes into its own typed result
// here, so callers never probe for keys by name.

use std::collections::BTreeMap;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{Device, UserProfile};

/// Fields shared by every envelope.
pub trait Envelope {
    /// The backend's `success` flag (`false` when absent).
    fn is_success(&self) -> bool;

    /// Human-readable message, preferring `message` over `error`.
    fn message(&self) -> Option<&str>;
}

macro_rules! impl_envelope {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Envelope for $ty {
                fn is_success(&self) -> bool {
                    self.success
                }

                fn message(&self) -> Option<&str> {
                    self.message.as_deref().or(self.error.as_deref())
                }
            }
        )+
    };
}

/// `POST /auth/login`, `POST /auth/register`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "secret_token")]
    pub token: Option<SecretString>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

fn secret_token<'de, D: Deserializer<'de>>(de: D) -> Result<Option<SecretString>, D::Error> {
    Ok(Option::<String>::deserialize(de)?
        .filter(|t| !t.is_empty())
        .map(SecretString::from))
}

/// `GET /equipos`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceListResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "equipos", default)]
    pub devices: Option<Vec<Device>>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub user_role: Option<String>,
}

/// `GET /equipos/:id`, `POST /equipos`, `PUT /equipos/:id`,
/// `GET /equipos/:id/estado`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(rename = "equipo", default)]
    pub device: Option<Device>,
}

/// Any endpoint whose payload callers only inspect for `success`/`message`
/// (logout, delete, wake, admin assignment).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenericResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// `GET /admin/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub users: Option<Vec<UserProfile>>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// `POST /admin/users`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Permission flags reported by `GET /me`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub can_create_equipos: bool,
    #[serde(default)]
    pub can_manage_users: bool,
}

/// `GET /me`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub equipos_count: Option<u64>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

/// `GET /status` (unauthenticated health probe).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub endpoints: BTreeMap<String, Vec<String>>,
}

impl_envelope!(
    AuthResult,
    DeviceListResult,
    DeviceResult,
    GenericResult,
    UserListResult,
    UserResult,
    MeResult,
    StatusResult,
);
