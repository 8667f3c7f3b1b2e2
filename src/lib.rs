pub mod client;
pub mod core;
pub mod gateway;

pub use crate::client::{build_client, BotClient};
pub use crate::core::{config::BackendConfig, errors::ApiError, types::*};
