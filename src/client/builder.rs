use crate::client::BotClient;
use crate::core::config::BackendConfig;
use crate::core::errors::ApiError;
use crate::core::kernel::{ReqwestRest, RestClientBuilder, RestClientConfig, TokenStore};
use std::sync::Arc;

/// Assemble a ready-to-use client from a backend configuration.
///
/// The token store is selected from the configured cache path: a path gets
/// the persistent file cache, no path degrades to the in-memory-only store.
pub fn build_client(config: BackendConfig) -> Result<BotClient<ReqwestRest>, ApiError> {
    let tokens = Arc::new(TokenStore::from_cache_path(config.token_cache_path.clone()));

    let rest_config = RestClientConfig::new(config.base_url.clone(), "dashboard".to_string())
        .with_timeout(config.timeout_seconds);

    let rest = RestClientBuilder::new(rest_config)
        .with_token_store(Arc::clone(&tokens))
        .build()?;

    Ok(BotClient::new(rest, config, tokens))
}
