// ── Form controllers ──
//
// Client-side validation and submit flows for the login/register form,
// the device edit form, and a single device card. Every outcome is also
// pushed onto the notification bus; invalid input never reaches the
// network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::debug;
use wakelan_api::{
    ApiClient, Device, DeviceId, DeviceState, Envelope, LoginCredentials, UpdateDevice,
};

use crate::error::CoreError;
use crate::notify::NotificationBus;
use crate::session::SessionManager;
use crate::validate::validate_ip;

/// Minimum password length accepted when registering.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Trimmed MAC input shorter than this is rejected by the edit form.
pub const MIN_MAC_INPUT_LEN: usize = 12;

/// How long a device card ignores further wake requests.
pub const WAKE_COOLDOWN: Duration = Duration::from_secs(2);

const CONNECTION_ERROR: &str = "Connection error";
const CONNECTION_FALLBACK: &str = "Could not reach the server";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

fn connection_message(err: &CoreError) -> String {
    let message = err.user_message();
    if message.trim().is_empty() {
        CONNECTION_FALLBACK.to_owned()
    } else {
        message
    }
}

// ── Login form ──────────────────────────────────────────────────────

/// What a login form submit ended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Validation failed; nothing was sent.
    Invalid,
    LoggedIn,
    /// The backend refused the credentials (`success: false` or a 401).
    Rejected,
    Registered,
    /// Registration answered without `success`.
    RegistrationRefused,
    /// The request itself failed.
    Failed,
}

pub struct LoginForm {
    session: Arc<SessionManager>,
    notifications: NotificationBus,
    register_mode: bool,
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(session: Arc<SessionManager>, notifications: NotificationBus) -> Self {
        Self {
            session,
            notifications,
            register_mode: false,
            username: String::new(),
            password: String::new(),
        }
    }

    pub fn is_register_mode(&self) -> bool {
        self.register_mode
    }

    /// Switch between login and register, clearing both fields.
    pub fn toggle_mode(&mut self) {
        self.register_mode = !self.register_mode;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.username.clear();
        self.password.clear();
    }

    pub fn loading(&self) -> bool {
        self.session.loading()
    }

    /// First validation failure, if any.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.username.trim().is_empty() {
            return Err(CoreError::validation("username", "Username is required"));
        }
        if self.password.is_empty() {
            return Err(CoreError::validation("password", "Password is required"));
        }
        if self.register_mode && self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::validation(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        Ok(())
    }

    pub async fn submit(&mut self) -> LoginOutcome {
        if let Err(e) = self.validate() {
            self.notifications.error("Validation error", Some(e.user_message()));
            return LoginOutcome::Invalid;
        }

        let credentials = LoginCredentials::new(self.username.clone(), self.password.clone());

        if self.register_mode {
            match self.session.register(&credentials).await {
                Ok(true) => {
                    self.notifications.success(
                        "Registration successful",
                        Some("Account created. You can now log in.".into()),
                    );
                    self.register_mode = false;
                    self.password.clear();
                    LoginOutcome::Registered
                }
                Ok(false) => LoginOutcome::RegistrationRefused,
                Err(e) => self.connection_failed(&e),
            }
        } else {
            match self.session.login(&credentials).await {
                Ok(true) => {
                    self.notifications
                        .success("Welcome", Some(format!("Hello {}!", self.username)));
                    LoginOutcome::LoggedIn
                }
                Ok(false) => self.credentials_rejected(None),
                // The backend answers bad credentials with a 401.
                Err(CoreError::Unauthorized { message }) => {
                    self.credentials_rejected(Some(message))
                }
                Err(e) => self.connection_failed(&e),
            }
        }
    }

    fn credentials_rejected(&self, message: Option<String>) -> LoginOutcome {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| INVALID_CREDENTIALS.to_owned());
        self.notifications.error("Authentication error", Some(message));
        LoginOutcome::Rejected
    }

    fn connection_failed(&self, err: &CoreError) -> LoginOutcome {
        self.notifications.error(CONNECTION_ERROR, Some(connection_message(err)));
        LoginOutcome::Failed
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("register_mode", &self.register_mode)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

// ── Device edit form ────────────────────────────────────────────────

pub struct DeviceEditForm {
    api: ApiClient,
    notifications: NotificationBus,
    pub id: Option<DeviceId>,
    pub name: String,
    pub description: String,
    pub mac_address: String,
    pub ip_address: String,
    pub state: DeviceState,
}

impl DeviceEditForm {
    pub fn new(api: ApiClient, notifications: NotificationBus) -> Self {
        Self {
            api,
            notifications,
            id: None,
            name: String::new(),
            description: String::new(),
            mac_address: String::new(),
            ip_address: String::new(),
            state: DeviceState::Unknown,
        }
    }

    /// Populate every field from an existing device.
    pub fn load(&mut self, device: &Device) {
        self.id = Some(device.id);
        self.name.clone_from(&device.name);
        self.description = device.description.clone().unwrap_or_default();
        self.mac_address.clone_from(&device.mac_address);
        self.ip_address = device.ip_address.clone().unwrap_or_default();
        self.state = device.state;
    }

    pub fn reset(&mut self) {
        self.id = None;
        self.name.clear();
        self.description.clear();
        self.mac_address.clear();
        self.ip_address.clear();
        self.state = DeviceState::Unknown;
    }

    pub fn loading(&self) -> bool {
        self.api.loading()
    }

    /// Loose check: non-blank name, at least 12 MAC characters, and an
    /// empty or dotted-quad IP.
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && self.mac_address.trim().chars().count() >= MIN_MAC_INPUT_LEN
            && validate_ip(&self.ip_address)
    }

    /// Request body for the current field values.
    pub fn to_update(&self) -> UpdateDevice {
        UpdateDevice {
            name: Some(self.name.trim().to_owned()),
            description: Some(non_blank(&self.description)),
            mac_address: Some(self.mac_address.to_uppercase().trim().to_owned()),
            ip_address: Some(non_blank(&self.ip_address)),
        }
    }

    /// Send the update. Returns `true` only when the backend confirmed it.
    pub async fn submit(&self) -> bool {
        let Some(id) = self.id.filter(|_| self.is_valid()) else {
            self.notifications.error(
                "Validation error",
                Some("Please fill in all required fields correctly".into()),
            );
            return false;
        };

        match self.api.update_device(id, &self.to_update()).await {
            Ok(res) if res.is_success() => {
                self.notifications.success(
                    "Device updated",
                    Some(format!("{} was updated", self.name)),
                );
                true
            }
            Ok(res) => {
                self.notifications.error(
                    "Update failed",
                    Some(res.message().unwrap_or("Could not update the device").to_owned()),
                );
                false
            }
            Err(e) => {
                self.notifications
                    .error(CONNECTION_ERROR, Some(connection_message(&e.into())));
                false
            }
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

impl std::fmt::Debug for DeviceEditForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceEditForm")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("mac_address", &self.mac_address)
            .field("ip_address", &self.ip_address)
            .finish_non_exhaustive()
    }
}

// ── Device card ─────────────────────────────────────────────────────

/// Display name of a power state.
pub fn status_label(state: DeviceState) -> &'static str {
    match state {
        DeviceState::On => "On",
        DeviceState::Off => "Off",
        DeviceState::Unknown => "Unknown",
    }
}

pub fn status_icon(state: DeviceState) -> &'static str {
    match state {
        DeviceState::On => "🟢",
        DeviceState::Off => "🔴",
        DeviceState::Unknown => "🟡",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardWake {
    /// A wake was already in flight or cooling down.
    Ignored,
    Sent,
    Refused,
    Failed,
}

pub struct DeviceCard {
    api: ApiClient,
    notifications: NotificationBus,
    device: RwLock<Device>,
    waking: Arc<AtomicBool>,
    refreshing: AtomicBool,
}

impl DeviceCard {
    pub fn new(api: ApiClient, notifications: NotificationBus, device: Device) -> Self {
        Self {
            api,
            notifications,
            device: RwLock::new(device),
            waking: Arc::new(AtomicBool::new(false)),
            refreshing: AtomicBool::new(false),
        }
    }

    pub fn device(&self) -> Device {
        self.device
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_waking(&self) -> bool {
        self.waking.load(Ordering::SeqCst)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    pub fn status_label(&self) -> &'static str {
        status_label(self.state())
    }

    pub fn status_icon(&self) -> &'static str {
        status_icon(self.state())
    }

    fn state(&self) -> DeviceState {
        self.device
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    /// Send a Wake-on-LAN request via `POST /wake`.
    ///
    /// Calls made while a previous wake is in flight, or within
    /// [`WAKE_COOLDOWN`] after it finished, are ignored.
    pub async fn wake(&self) -> CardWake {
        if self.waking.swap(true, Ordering::SeqCst) {
            debug!("wake already in progress, ignoring");
            return CardWake::Ignored;
        }

        let Device { id, name, .. } = self.device();
        let outcome = match self.api.wake(id).await {
            Ok(res) if res.is_success() => {
                self.notifications.success(
                    "Command sent",
                    Some(format!("Wake-on-LAN packet sent to {name}")),
                );
                CardWake::Sent
            }
            Ok(res) => {
                self.notifications.error(
                    "Error",
                    Some(res.message().unwrap_or("Failed to send command").to_owned()),
                );
                CardWake::Refused
            }
            Err(e) => {
                debug!(error = %e, id, "wake request failed");
                self.notifications.error(
                    CONNECTION_ERROR,
                    Some(format!("Could not send the command to {name}")),
                );
                CardWake::Failed
            }
        };

        self.release_after_cooldown();
        outcome
    }

    /// Re-probe the device and update the card's copy.
    ///
    /// Returns `false` if a refresh was already running or the probe
    /// failed.
    pub async fn refresh(&self) -> bool {
        if self.refreshing.swap(true, Ordering::SeqCst) {
            return false;
        }

        let id = self.device().id;
        let ok = match self.api.device_status(id).await {
            Ok(res) => match (res.is_success(), res.device) {
                (true, Some(device)) => {
                    self.notifications.success(
                        "Status updated",
                        Some(format!("Status of {} checked", device.name)),
                    );
                    *self.device.write().unwrap_or_else(PoisonError::into_inner) = device;
                    true
                }
                _ => {
                    self.notifications
                        .error("Error", Some("Could not update the status".into()));
                    false
                }
            },
            Err(e) => {
                self.notifications
                    .error("Error", Some(connection_message(&e.into())));
                false
            }
        };

        self.refreshing.store(false, Ordering::SeqCst);
        ok
    }

    fn release_after_cooldown(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            self.waking.store(false, Ordering::SeqCst);
            return;
        };
        let deadline = tokio::time::Instant::now() + WAKE_COOLDOWN;
        let waking = Arc::clone(&self.waking);
        handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            waking.store(false, Ordering::SeqCst);
        });
    }
}

impl std::fmt::Debug for DeviceCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceCard")
            .field("device", &self.device())
            .field("waking", &self.is_waking())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use wakelan_api::{CredentialStore, Transport, TransportConfig};

    use super::*;

    fn offline_api() -> ApiClient {
        // Nothing listens on port 9; these tests never reach the network.
        let config =
            TransportConfig::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap();
        let transport = Transport::new(&config, Arc::new(CredentialStore::in_memory())).unwrap();
        ApiClient::new(Arc::new(transport))
    }

    fn edit_form() -> DeviceEditForm {
        DeviceEditForm::new(offline_api(), NotificationBus::new())
    }

    #[test]
    fn edit_form_validity() {
        let mut form = edit_form();
        form.name = "desk".into();
        form.mac_address = "aabbccddeeff".into();
        assert!(form.is_valid());

        form.ip_address = "999.1.1.1".into();
        assert!(!form.is_valid());

        form.ip_address = " 192.168.1.9 ".into();
        assert!(form.is_valid());

        form.mac_address = "aabbccdd".into();
        assert!(!form.is_valid());

        form.mac_address = "aabbccddeeff".into();
        form.name = "   ".into();
        assert!(!form.is_valid());
    }

    #[test]
    fn edit_form_body_trims_and_nulls_blanks() {
        let mut form = edit_form();
        form.name = "  desk  ".into();
        form.description = "   ".into();
        form.mac_address = " aa:bb:cc:dd:ee:ff ".into();
        form.ip_address = String::new();

        let body = form.to_update();
        assert_eq!(body.name.as_deref(), Some("desk"));
        assert_eq!(body.description, Some(None));
        assert_eq!(body.mac_address.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
        assert_eq!(body.ip_address, Some(None));
    }

    #[test]
    fn load_then_reset() {
        let mut form = edit_form();
        form.load(&Device {
            id: 4,
            name: "nas".into(),
            description: Some("rack".into()),
            mac_address: "AA:BB:CC:DD:EE:FF".into(),
            ip_address: None,
            state: DeviceState::On,
        });
        assert_eq!(form.id, Some(4));
        assert_eq!(form.description, "rack");
        assert_eq!(form.state, DeviceState::On);

        form.reset();
        assert_eq!(form.id, None);
        assert!(form.name.is_empty());
        assert_eq!(form.state, DeviceState::Unknown);
    }

    #[tokio::test]
    async fn invalid_edit_form_notifies_without_sending() {
        let form = edit_form();
        assert!(!form.submit().await);
        let shown = form.notifications.snapshot();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Validation error");
    }

    #[test]
    fn card_labels() {
        let card = DeviceCard::new(
            offline_api(),
            NotificationBus::new(),
            Device {
                id: 1,
                name: "desk".into(),
                description: None,
                mac_address: "AA:BB:CC:DD:EE:FF".into(),
                ip_address: None,
                state: DeviceState::Off,
            },
        );
        assert_eq!(card.status_label(), "Off");
        assert_eq!(card.status_icon(), "🔴");
    }
}
