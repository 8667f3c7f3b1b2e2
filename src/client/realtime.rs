use crate::core::config::BackendConfig;
use crate::core::errors::ApiError;
use crate::core::kernel::ws::{self, RealtimeConnection};
use crate::core::kernel::TokenStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Realtime notification channel, modeled as a capability that may be
/// absent.
///
/// When the configuration disables realtime, [`connect`](Self::connect)
/// returns `Ok(None)` and callers must treat the missing connection as a
/// valid, non-error outcome. The returned handle is owned by the caller;
/// this client keeps no reference to it.
pub struct RealtimeApi {
    config: BackendConfig,
    tokens: Arc<TokenStore>,
}

impl RealtimeApi {
    pub fn new(config: BackendConfig, tokens: Arc<TokenStore>) -> Self {
        Self { config, tokens }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.realtime
    }

    /// Open the notification channel with the currently stored token.
    ///
    /// The channel never reconnects on its own. A caller that wants
    /// reconnection waits a bounded backoff after the connection closes and
    /// calls this again; the token is re-read from the store at that
    /// point, so a re-login between attempts is picked up automatically.
    pub async fn connect<F>(&self, on_message: F) -> Result<Option<RealtimeConnection>, ApiError>
    where
        F: Fn(Value) + Send + 'static,
    {
        if !self.config.realtime {
            debug!("realtime channel disabled by configuration");
            return Ok(None);
        }

        let token = self.tokens.get().ok_or_else(|| {
            ApiError::AuthError("realtime channel requires a stored access token".to_string())
        })?;

        let url = format!(
            "{}/ws/notifications?token={}",
            self.config.websocket_base(),
            token
        );

        ws::connect(&url, on_message).await.map(Some)
    }
}
