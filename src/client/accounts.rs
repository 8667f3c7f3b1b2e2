use crate::core::errors::ApiError;
use crate::core::kernel::RestClient;
use crate::core::types::{BrokerAccount, BrokerAccountUpdate, NewBrokerAccount};
use tracing::instrument;

/// Broker account management.
pub struct AccountsApi<R: RestClient> {
    rest: R,
}

impl<R: RestClient> AccountsApi<R> {
    pub fn new(rest: &R) -> Self
    where
        R: Clone,
    {
        Self { rest: rest.clone() }
    }

    /// All broker accounts registered for this user.
    pub async fn list(&self) -> Result<Vec<BrokerAccount>, ApiError> {
        self.rest.get_json("/account/broker", &[], true).await
    }

    /// The account marked primary.
    pub async fn primary(&self) -> Result<BrokerAccount, ApiError> {
        self.rest
            .get_json("/account/broker/primary", &[], true)
            .await
    }

    /// Register a broker account.
    #[instrument(skip(self, account), fields(account_name = %account.account_name))]
    pub async fn create(&self, account: &NewBrokerAccount) -> Result<BrokerAccount, ApiError> {
        let body = serde_json::to_value(account)?;
        self.rest.post_json("/account/broker", &body, true).await
    }

    /// Apply a partial update to an account.
    #[instrument(skip(self, update), fields(id = %id))]
    pub async fn update(
        &self,
        id: &str,
        update: &BrokerAccountUpdate,
    ) -> Result<BrokerAccount, ApiError> {
        let body = serde_json::to_value(update)?;
        self.rest
            .put_json(&format!("/account/broker/{}", id), &body, true)
            .await
    }

    #[instrument(skip(self), fields(id = %id))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.rest
            .delete(&format!("/account/broker/{}", id), &[], true)
            .await?;
        Ok(())
    }
}
