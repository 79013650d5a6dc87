// App context
//
// One per process. Owns the credential store, the shared transport and
// the notification bus, and hands out managers wired to them. Each
// manager gets its own call facade so loading/error flags stay separate.

use std::sync::Arc;

use wakelan_api::{ApiClient, CredentialStore, Device, Transport, TransportConfig};

use crate::admin::AdminManager;
use crate::devices::DeviceManager;
use crate::error::CoreError;
use crate::forms::{DeviceCard, DeviceEditForm, LoginForm};
use crate::notify::NotificationBus;
use crate::session::SessionManager;

#[derive(Clone)]
pub struct AppContext {
    transport: Arc<Transport>,
    notifications: NotificationBus,
}

impl AppContext {
    /// Build the transport from `config` with the default middleware.
    pub fn new(config: &TransportConfig, credentials: CredentialStore) -> Result<Self, CoreError> {
        let transport = Transport::new(config, Arc::new(credentials))?;
        Ok(Self::from_transport(Arc::new(transport)))
    }

    /// Wrap an already-built transport (custom middleware, tests).
    pub fn from_transport(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            notifications: NotificationBus::new(),
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        self.transport.credentials()
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    pub fn notifications(&self) -> &NotificationBus {
        &self.notifications
    }

    /// A fresh call facade over the shared transport.
    pub fn api(&self) -> ApiClient {
        ApiClient::new(Arc::clone(&self.transport))
    }

    pub fn session(&self) -> SessionManager {
        SessionManager::new(self.api())
    }

    pub fn devices(&self) -> DeviceManager {
        DeviceManager::new(self.api())
    }

    pub fn admin(&self) -> AdminManager {
        AdminManager::new(self.api())
    }

    pub fn login_form(&self) -> LoginForm {
        LoginForm::new(Arc::new(self.session()), self.notifications.clone())
    }

    pub fn device_edit_form(&self) -> DeviceEditForm {
        DeviceEditForm::new(self.api(), self.notifications.clone())
    }

    pub fn device_card(&self, device: Device) -> DeviceCard {
        DeviceCard::new(self.api(), self.notifications.clone(), device)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("transport", &self.transport)
            .field("notifications", &self.notifications)
            .finish()
    }
}
