// Device endpoints (`/equipos`)

use serde_json::json;
use tracing::debug;

use crate::envelope::{DeviceListResult, DeviceResult, GenericResult};
use crate::error::Error;
use crate::facade::ApiClient;
use crate::models::{CreateDevice, DeviceId, UpdateDevice};

impl ApiClient {
    /// Devices visible to the current user (all of them for admins).
    ///
    /// `GET /equipos`
    pub async fn list_devices(&self) -> Result<DeviceListResult, Error> {
        self.get("equipos").await
    }

    /// `GET /equipos/{id}`
    pub async fn get_device(&self, id: DeviceId) -> Result<DeviceResult, Error> {
        self.get(&format!("equipos/{id}")).await
    }

    /// `POST /equipos`
    pub async fn create_device(&self, body: &CreateDevice) -> Result<DeviceResult, Error> {
        debug!(name = %body.name, "creating device");
        self.post("equipos", body).await
    }

    /// `PUT /equipos/{id}`
    pub async fn update_device(
        &self,
        id: DeviceId,
        body: &UpdateDevice,
    ) -> Result<DeviceResult, Error> {
        debug!(id, "updating device");
        self.put(&format!("equipos/{id}"), body).await
    }

    /// `DELETE /equipos/{id}`
    pub async fn delete_device(&self, id: DeviceId) -> Result<GenericResult, Error> {
        debug!(id, "deleting device");
        self.delete(&format!("equipos/{id}")).await
    }

    /// Send the magic packet through the device's own endpoint.
    ///
    /// `POST /equipos/{id}/encender`
    pub async fn wake_device(&self, id: DeviceId) -> Result<GenericResult, Error> {
        debug!(id, "waking device");
        self.post_empty(&format!("equipos/{id}/encender")).await
    }

    /// Probe reachability and return the device with a fresh `estado`.
    ///
    /// `GET /equipos/{id}/estado`
    pub async fn device_status(&self, id: DeviceId) -> Result<DeviceResult, Error> {
        self.get(&format!("equipos/{id}/estado")).await
    }

    /// `POST /wake` with `{"id": ...}`
    pub async fn wake(&self, id: DeviceId) -> Result<GenericResult, Error> {
        debug!(id, "waking device by id");
        self.post("wake", &json!({ "id": id })).await
    }
}
