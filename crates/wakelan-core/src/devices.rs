// Device manager
//
// Local ordered copy of the user's devices. Create and update re-fetch the
// whole list once the mutation succeeds; delete splices the entry out
// locally; status patches one entry in place.

use std::sync::{PoisonError, RwLock};

use tracing::debug;
use wakelan_api::{ApiClient, CreateDevice, Device, DeviceId, Envelope, UpdateDevice};

use crate::error::CoreError;

pub struct DeviceManager {
    api: ApiClient,
    devices: RwLock<Vec<Device>>,
    current: RwLock<Option<Device>>,
}

impl DeviceManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            devices: RwLock::new(Vec::new()),
            current: RwLock::new(None),
        }
    }

    // ── Local state ──────────────────────────────────────────────────

    /// Snapshot of the local list, in server order.
    pub fn devices(&self) -> Vec<Device> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The device most recently loaded by [`fetch_one`](Self::fetch_one).
    pub fn current(&self) -> Option<Device> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look a device up in the local list.
    pub fn find(&self, id: DeviceId) -> Option<Device> {
        self.devices
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.id == id)
            .cloned()
    }

    pub fn loading(&self) -> bool {
        self.api.loading()
    }

    pub fn error(&self) -> Option<String> {
        self.api.error()
    }

    // ── Remote operations ────────────────────────────────────────────

    /// Replace the local list with the server's. A response without
    /// `success` or without `equipos` leaves the list untouched.
    pub async fn fetch_all(&self) -> Result<Vec<Device>, CoreError> {
        let res = self.api.list_devices().await?;
        if let (true, Some(devices)) = (res.is_success(), res.devices) {
            debug!(count = devices.len(), "device list refreshed");
            *self.devices.write().unwrap_or_else(PoisonError::into_inner) = devices;
        }
        Ok(self.devices())
    }

    pub async fn fetch_one(&self, id: DeviceId) -> Result<Option<Device>, CoreError> {
        let res = self.api.get_device(id).await?;
        match (res.is_success(), res.device) {
            (true, Some(device)) => {
                *self.current.write().unwrap_or_else(PoisonError::into_inner) =
                    Some(device.clone());
                Ok(Some(device))
            }
            _ => Ok(None),
        }
    }

    pub async fn create(&self, data: &CreateDevice) -> Result<bool, CoreError> {
        let res = self.api.create_device(data).await?;
        if !res.is_success() {
            return Ok(false);
        }
        self.fetch_all().await?;
        Ok(true)
    }

    pub async fn update(&self, id: DeviceId, data: &UpdateDevice) -> Result<bool, CoreError> {
        let res = self.api.update_device(id, data).await?;
        if !res.is_success() {
            return Ok(false);
        }
        self.fetch_all().await?;
        Ok(true)
    }

    pub async fn delete(&self, id: DeviceId) -> Result<bool, CoreError> {
        let res = self.api.delete_device(id).await?;
        if !res.is_success() {
            return Ok(false);
        }
        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|d| d.id != id);
        Ok(true)
    }

    /// `POST /equipos/{id}/encender`
    pub async fn wake(&self, id: DeviceId) -> Result<bool, CoreError> {
        Ok(self.api.wake_device(id).await?.is_success())
    }

    /// `POST /wake` with the id in the body.
    pub async fn wake_by_body(&self, id: DeviceId) -> Result<bool, CoreError> {
        Ok(self.api.wake(id).await?.is_success())
    }

    /// Probe a device and patch its local entry in place.
    ///
    /// A device not in the local list is returned without being added.
    pub async fn status(&self, id: DeviceId) -> Result<Option<Device>, CoreError> {
        let res = self.api.device_status(id).await?;
        let (true, Some(device)) = (res.is_success(), res.device) else {
            return Ok(None);
        };

        if let Some(slot) = self
            .devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_mut()
            .find(|d| d.id == id)
        {
            *slot = device.clone();
        }
        Ok(Some(device))
    }
}

impl std::fmt::Debug for DeviceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("devices", &self.devices())
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}
