// Admin endpoints (`/admin/*`)
//
// The backend answers 403 for non-admin tokens; that surfaces as a
// regular `Error::Http`.

use serde_json::json;
use tracing::debug;

use crate::envelope::{GenericResult, UserListResult, UserResult};
use crate::error::Error;
use crate::facade::ApiClient;
use crate::models::{CreateUser, DeviceId, UserId};

impl ApiClient {
    /// `GET /admin/users`
    pub async fn list_users(&self) -> Result<UserListResult, Error> {
        self.get("admin/users").await
    }

    /// `POST /admin/users`
    pub async fn create_user(&self, body: &CreateUser) -> Result<UserResult, Error> {
        debug!(username = %body.username, "creating user");
        self.post("admin/users", body).await
    }

    /// Grant a user access to a device.
    ///
    /// `POST /admin/assign-equipo`
    pub async fn assign_device(
        &self,
        user_id: UserId,
        device_id: DeviceId,
    ) -> Result<GenericResult, Error> {
        debug!(user_id, device_id, "assigning device");
        self.post(
            "admin/assign-equipo",
            &json!({ "user_id": user_id, "equipo_id": device_id }),
        )
        .await
    }

    /// `POST /admin/unassign-equipo`
    pub async fn unassign_device(
        &self,
        user_id: UserId,
        device_id: DeviceId,
    ) -> Result<GenericResult, Error> {
        debug!(user_id, device_id, "unassigning device");
        self.post(
            "admin/unassign-equipo",
            &json!({ "user_id": user_id, "equipo_id": device_id }),
        )
        .await
    }
}
