use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("backend returned status {status}: {message}")]
    StatusError { status: u16, message: String },

    #[error("backend rejected request: {0}")]
    EnvelopeError(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Other error: {0}")]
    Other(String),
}
