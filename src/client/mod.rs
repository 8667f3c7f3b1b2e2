pub mod accounts;
pub mod auth;
pub mod bot;
pub mod builder;
pub mod performance;
pub mod realtime;
pub mod strategies;
pub mod system;
pub mod trading;

pub use builder::build_client;

use crate::core::config::BackendConfig;
use crate::core::kernel::{RestClient, TokenStore};
use std::sync::Arc;

/// Typed client for the trading-bot backend, composed of one sub-client per
/// operation area.
///
/// All sub-clients share one transport and one token store; the store is
/// per-instance, so two clients built from different configurations hold
/// independent sessions.
pub struct BotClient<R: RestClient> {
    pub auth: auth::AuthApi<R>,
    pub bot: bot::BotApi<R>,
    pub trading: trading::TradingApi<R>,
    pub performance: performance::PerformanceApi<R>,
    pub accounts: accounts::AccountsApi<R>,
    pub strategies: strategies::StrategyApi<R>,
    pub system: system::SystemApi<R>,
    pub realtime: realtime::RealtimeApi,
}

impl<R: RestClient + Clone> BotClient<R> {
    pub fn new(rest: R, config: BackendConfig, tokens: Arc<TokenStore>) -> Self {
        Self {
            auth: auth::AuthApi::new(&rest, Arc::clone(&tokens), config.auth_scheme),
            bot: bot::BotApi::new(&rest),
            trading: trading::TradingApi::new(&rest),
            performance: performance::PerformanceApi::new(&rest),
            accounts: accounts::AccountsApi::new(&rest),
            strategies: strategies::StrategyApi::new(&rest),
            system: system::SystemApi::new(&rest),
            realtime: realtime::RealtimeApi::new(config, Arc::clone(&tokens)),
        }
    }

    /// Token store backing this client's session.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        self.auth.tokens()
    }
}
