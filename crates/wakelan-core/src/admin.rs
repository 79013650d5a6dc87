// Admin manager
//
// User management and device assignment. A `success: false` envelope is
// turned into `CoreError::Api` carrying the backend's message.

use tracing::info;
use wakelan_api::{
    ApiClient, CreateUser, DeviceId, Envelope, Role, StatusResult, UserId, UserProfile,
};

use crate::error::CoreError;

pub struct AdminManager {
    api: ApiClient,
}

impl AdminManager {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_users(&self) -> Result<Vec<UserProfile>, CoreError> {
        let res = self.api.list_users().await?;
        ensure_success(&res, "could not list users")?;
        Ok(res.users.unwrap_or_default())
    }

    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: Option<Role>,
    ) -> Result<UserProfile, CoreError> {
        let body = CreateUser {
            username: username.to_owned(),
            password: password.to_owned(),
            role,
        };
        let res = self.api.create_user(&body).await?;
        ensure_success(&res, "could not create user")?;
        info!(username, "user created");
        res.user.ok_or_else(|| CoreError::Api {
            message: "backend did not return the created user".into(),
            status: None,
        })
    }

    /// Returns the backend's confirmation message.
    pub async fn assign(&self, user_id: UserId, device_id: DeviceId) -> Result<String, CoreError> {
        let res = self.api.assign_device(user_id, device_id).await?;
        ensure_success(&res, "could not assign device")?;
        Ok(res.message().unwrap_or("device assigned").to_owned())
    }

    /// Returns the backend's confirmation message.
    pub async fn unassign(
        &self,
        user_id: UserId,
        device_id: DeviceId,
    ) -> Result<String, CoreError> {
        let res = self.api.unassign_device(user_id, device_id).await?;
        ensure_success(&res, "could not unassign device")?;
        Ok(res.message().unwrap_or("device unassigned").to_owned())
    }

    /// Unauthenticated health probe.
    pub async fn server_status(&self) -> Result<StatusResult, CoreError> {
        Ok(self.api.server_status().await?)
    }
}

fn ensure_success(res: &impl Envelope, fallback: &str) -> Result<(), CoreError> {
    if res.is_success() {
        Ok(())
    } else {
        Err(CoreError::Api {
            message: res.message().unwrap_or(fallback).to_owned(),
            status: None,
        })
    }
}
