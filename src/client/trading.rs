use crate::core::errors::ApiError;
use crate::core::kernel::RestClient;
use crate::core::types::{Position, TestOrder, Trade};
use serde_json::{json, Value};
use tracing::instrument;

/// Trade queries and position management.
pub struct TradingApi<R: RestClient> {
    rest: R,
}

impl<R: RestClient> TradingApi<R> {
    pub fn new(rest: &R) -> Self
    where
        R: Clone,
    {
        Self { rest: rest.clone() }
    }

    /// Currently open positions.
    pub async fn open_positions(&self) -> Result<Vec<Position>, ApiError> {
        self.rest.get_json("/trades/open", &[], true).await
    }

    /// Historical trades, newest first.
    pub async fn history(&self, limit: Option<u32>) -> Result<Vec<Trade>, ApiError> {
        let limit_str = limit.map(|l| l.to_string());
        let mut params = vec![];

        if let Some(ref limit) = limit_str {
            params.push(("limit", limit.as_str()));
        }

        self.rest.get_json("/trades/history", &params, true).await
    }

    /// Trades from the last few days.
    pub async fn recent(&self) -> Result<Vec<Trade>, ApiError> {
        self.rest.get_json("/trades/recent", &[], true).await
    }

    /// Raw trade log entries.
    pub async fn logs(&self) -> Result<Value, ApiError> {
        self.rest.get("/trades/logs", &[], true).await
    }

    /// Close an open trade.
    #[instrument(skip(self), fields(trade_id = %trade_id))]
    pub async fn close(&self, trade_id: &str) -> Result<(), ApiError> {
        let body = json!({ "trade_id": trade_id });
        self.rest.post("/trades/close", &body, true).await?;
        Ok(())
    }

    /// Place a throwaway order to verify broker connectivity.
    #[instrument(skip(self, order), fields(symbol = %order.symbol, side = %order.side))]
    pub async fn place_test_order(&self, order: &TestOrder) -> Result<Value, ApiError> {
        let body = serde_json::to_value(order)?;
        self.rest.post("/orders/test", &body, true).await
    }
}
