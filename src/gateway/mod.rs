/// Same-origin reverse proxy for the trading-bot backend.
///
/// Mounts a wildcard route and forwards whatever arrives (any method, any
/// path, any query string, any body) to the configured backend, relaying
/// the response verbatim plus CORS headers. The backend's address stays
/// server-side; browsers only ever see the gateway's origin.
///
/// Each request is handled statelessly: the only shared state is the
/// backend URL and a pooled HTTP client, so concurrent requests need no
/// coordination.
pub mod forward;
pub mod headers;

use crate::core::config::GatewayConfig;
use axum::routing::delete;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

/// Shared, immutable state injected into every forward handler.
#[derive(Clone)]
pub struct GatewayState {
    pub backend_url: String,
    pub http: reqwest::Client,
}

impl GatewayState {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }
}

/// Build the gateway router over the given state.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route(
            "/{*path}",
            delete(forward::forward)
                .get(forward::forward)
                .patch(forward::forward)
                .post(forward::forward)
                .put(forward::forward)
                .options(forward::preflight),
        )
        .with_state(state)
}

/// Bind and serve the gateway until the process exits.
pub async fn serve(config: GatewayConfig) -> std::io::Result<()> {
    let state = GatewayState::new(config.backend_url);
    let app = router(state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "gateway listening");

    axum::serve(listener, app).await
}
