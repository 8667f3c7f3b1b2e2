use crate::core::errors::ApiError;
use crate::core::kernel::RestClient;
use crate::core::types::BotStatus;
use serde_json::Value;
use tracing::instrument;

/// Bot lifecycle control.
pub struct BotApi<R: RestClient> {
    rest: R,
}

impl<R: RestClient> BotApi<R> {
    pub fn new(rest: &R) -> Self
    where
        R: Clone,
    {
        Self { rest: rest.clone() }
    }

    /// Current bot status snapshot.
    pub async fn status(&self) -> Result<BotStatus, ApiError> {
        self.rest.get_json("/bot/status", &[], true).await
    }

    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<(), ApiError> {
        self.rest.post("/bot/start", &Value::Null, true).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<(), ApiError> {
        self.rest.post("/bot/stop", &Value::Null, true).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) -> Result<(), ApiError> {
        self.rest.post("/bot/pause", &Value::Null, true).await?;
        Ok(())
    }
}
