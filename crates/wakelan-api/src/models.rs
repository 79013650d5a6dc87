// ── Wire models ──
//
// Rust-side names are English; serde renames map them onto the backend's
// field names (`nombre`, `estado`, `equipos`, ...).

use secrecy::{ExposeSecret, SecretString};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Backend identifier for a device record.
pub type DeviceId = u64;

/// Backend identifier for a user account.
pub type UserId = u64;

// ── Users ───────────────────────────────────────────────────────────

/// Account role as reported by the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Admin,
    User,
}

/// Opaque user payload from the server. Not validated client-side; any
/// extra fields are kept so the persisted blob round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipos_count: Option<u64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|role| role.eq_ignore_ascii_case("admin"))
    }
}

/// Username/password pair for the auth endpoints.
///
/// The password is only exposed while serializing the request body.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: SecretString,
}

impl LoginCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl Serialize for LoginCredentials {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LoginCredentials", 2)?;
        state.serialize_field("username", &self.username)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

/// Body for `POST /admin/users`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

// ── Devices ─────────────────────────────────────────────────────────

/// Power state of a device.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum DeviceState {
    #[serde(rename = "encendido", alias = "Encendido")]
    #[strum(to_string = "encendido", serialize = "on")]
    On,
    #[serde(rename = "apagado", alias = "Apagado")]
    #[strum(to_string = "apagado", serialize = "off")]
    Off,
    #[default]
    #[serde(rename = "desconocido", alias = "Desconocido", other)]
    #[strum(to_string = "desconocido", serialize = "unknown")]
    Unknown,
}

/// A remotely wakeable machine tracked by the backend (`Equipo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mac_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(rename = "estado", default)]
    pub state: DeviceState,
}

/// Body for `POST /equipos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateDevice {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mac_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Body for `PUT /equipos/:id`. Absent fields are left untouched by the
/// server; `Some(None)` sends an explicit `null` to clear the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateDevice {
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<Option<String>>,
}
