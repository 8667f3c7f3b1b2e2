use crate::core::errors::ApiError;
use crate::core::kernel::RestClient;
use crate::core::types::{DailySummary, EquityCurvePoint, PerformanceStats};

/// Performance reporting queries.
pub struct PerformanceApi<R: RestClient> {
    rest: R,
}

impl<R: RestClient> PerformanceApi<R> {
    pub fn new(rest: &R) -> Self
    where
        R: Clone,
    {
        Self { rest: rest.clone() }
    }

    pub async fn stats(&self) -> Result<PerformanceStats, ApiError> {
        self.rest.get_json("/performance/stats", &[], true).await
    }

    pub async fn equity_curve(&self) -> Result<Vec<EquityCurvePoint>, ApiError> {
        self.rest
            .get_json("/performance/equity-curve", &[], true)
            .await
    }

    pub async fn daily_summary(&self) -> Result<Vec<DailySummary>, ApiError> {
        self.rest
            .get_json("/performance/daily-summary", &[], true)
            .await
    }
}
