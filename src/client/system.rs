use crate::core::errors::ApiError;
use crate::core::kernel::RestClient;
use crate::core::types::SystemStatus;
use serde_json::{json, Value};
use tracing::instrument;

/// System health and device registration.
pub struct SystemApi<R: RestClient> {
    rest: R,
}

impl<R: RestClient> SystemApi<R> {
    pub fn new(rest: &R) -> Self
    where
        R: Clone,
    {
        Self { rest: rest.clone() }
    }

    /// Health probe. Public, never authenticated.
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.rest.get("/health", &[], false).await
    }

    /// Public API metadata.
    pub async fn info(&self) -> Result<Value, ApiError> {
        self.rest.get("/info", &[], false).await
    }

    pub async fn status(&self) -> Result<SystemStatus, ApiError> {
        self.rest.get_json("/system/status", &[], true).await
    }

    /// Register a device token for push notifications.
    #[instrument(skip(self, token))]
    pub async fn register_device(&self, token: &str) -> Result<(), ApiError> {
        let body = json!({ "token": token });
        self.rest.post("/device/register", &body, true).await?;
        Ok(())
    }
}
