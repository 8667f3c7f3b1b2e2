use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credential issued by the backend on successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthCredential {
    pub access_token: String,
    pub token_type: String,
}

/// Live snapshot of the trading bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotStatus {
    pub is_running: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub equity: Decimal,
    pub open_positions: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub daily_pnl: Decimal,
    pub total_trades: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub win_rate: Decimal,
}

/// A closed or partially closed trade as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub trade_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub entry_price: Decimal,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub exit_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
    /// ISO-8601 timestamp, passed through exactly as the backend emits it.
    pub timestamp: String,
}

/// An open position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub side: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub entry_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub profit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceStats {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_return: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sharpe_ratio: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub max_drawdown: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub win_rate: Decimal,
    pub total_trades: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityCurvePoint {
    pub timestamp: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub equity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub pnl: Decimal,
    pub trades: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub win_rate: Decimal,
}

/// A broker account registered with the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerAccount {
    pub id: String,
    pub account_number: String,
    pub account_name: String,
    pub broker: String,
    pub server: String,
    pub is_primary: bool,
    pub created_at: String,
}

/// Payload for registering a broker account. The password travels to the
/// backend once and is never echoed back.
#[derive(Debug, Clone, Serialize)]
pub struct NewBrokerAccount {
    pub account_number: String,
    pub account_name: String,
    pub broker: String,
    pub server: String,
    pub password: String,
    pub is_primary: bool,
}

/// Partial update for a broker account; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrokerAccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
}

/// Active strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub symbols: Vec<String>,
    pub timeframe: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub risk_per_trade: Decimal,
    pub max_positions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyStatus {
    Active,
    Inactive,
    Validated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StrategyMode {
    Demo,
    Live,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: StrategyStatus,
    pub mode: StrategyMode,
    pub created_at: String,
}

/// Risk policy attached to a deployed strategy; all limits are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyPolicy {
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_daily_loss: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_position_size: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_symbols: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub status: String,
    pub uptime: u64,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A throwaway order used to verify broker connectivity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOrder {
    pub symbol: String,
    pub side: OrderSide,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
}
