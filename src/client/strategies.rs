use crate::core::errors::ApiError;
use crate::core::kernel::RestClient;
use crate::core::types::{Strategy, StrategyConfig, StrategyPolicy};
use serde_json::Value;
use tracing::instrument;

/// Strategy configuration and lifecycle management.
pub struct StrategyApi<R: RestClient> {
    rest: R,
}

impl<R: RestClient> StrategyApi<R> {
    pub fn new(rest: &R) -> Self
    where
        R: Clone,
    {
        Self { rest: rest.clone() }
    }

    /// Active strategy parameters.
    pub async fn config(&self) -> Result<StrategyConfig, ApiError> {
        self.rest.get_json("/strategy/config", &[], true).await
    }

    /// Replace the active strategy parameters.
    #[instrument(skip(self, config))]
    pub async fn update_config(&self, config: &StrategyConfig) -> Result<(), ApiError> {
        let body = serde_json::to_value(config)?;
        self.rest.post("/strategy/config", &body, true).await?;
        Ok(())
    }

    /// Symbols the backend can trade.
    pub async fn symbols(&self) -> Result<Vec<String>, ApiError> {
        self.rest.get_json("/strategy/symbols", &[], true).await
    }

    /// All uploaded strategies.
    pub async fn all(&self) -> Result<Vec<Strategy>, ApiError> {
        self.rest.get_json("/strategies", &[], true).await
    }

    /// Strategies that passed validation.
    pub async fn validated(&self) -> Result<Vec<Strategy>, ApiError> {
        self.rest.get_json("/strategies/validated", &[], true).await
    }

    /// Strategies currently running.
    pub async fn active(&self) -> Result<Vec<Strategy>, ApiError> {
        self.rest.get_json("/strategies/active", &[], true).await
    }

    /// Upload a strategy file. Travels as a multipart form with a single
    /// `file` field; the content type is the multipart boundary, not JSON.
    #[instrument(skip(self, bytes), fields(file = %file_name, size = bytes.len()))]
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<Value, ApiError> {
        self.rest
            .post_multipart("/strategies", file_name, bytes, true)
            .await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn activate(&self, id: &str) -> Result<(), ApiError> {
        self.rest
            .put(&format!("/strategies/{}/activate", id), &Value::Null, true)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn deactivate(&self, id: &str) -> Result<(), ApiError> {
        self.rest
            .put(
                &format!("/strategies/{}/deactivate", id),
                &Value::Null,
                true,
            )
            .await?;
        Ok(())
    }

    /// Promote a validated strategy to live mode.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn promote(&self, id: &str) -> Result<(), ApiError> {
        self.rest
            .put(&format!("/strategies/{}/promote", id), &Value::Null, true)
            .await?;
        Ok(())
    }

    /// Patch the risk policy of a deployed strategy.
    #[instrument(skip(self, policy), fields(id = %id))]
    pub async fn update_policy(&self, id: &str, policy: &StrategyPolicy) -> Result<(), ApiError> {
        let body = serde_json::to_value(policy)?;
        self.rest
            .patch(&format!("/strategies/{}/policy", id), &body, true)
            .await?;
        Ok(())
    }
}
