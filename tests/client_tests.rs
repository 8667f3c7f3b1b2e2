use axum::extract::{Multipart, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tradebridge::build_client;
use tradebridge::core::config::{AuthScheme, BackendConfig};
use tradebridge::core::errors::ApiError;
use tradebridge::core::kernel::TokenStore;

const TOKEN: &str = "tok-session-1";

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn stats_payload() -> Value {
    json!({
        "total_return": 0.42,
        "sharpe_ratio": 1.3,
        "max_drawdown": 0.2,
        "win_rate": 0.55,
        "total_trades": 128
    })
}

// --- bare-convention backend -------------------------------------------------

async fn bare_login(Json(body): Json<Value>) -> Response {
    if body["email"] != "user@example.com" || body["password"] != "hunter2" {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
}

async fn bare_history(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if bearer(&headers) != Some(TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if params.get("limit").map(String::as_str) != Some("5") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!([{
        "id": "t-1",
        "symbol": "EURUSD",
        "type": "BUY",
        "entry_price": 1.25,
        "exit_price": 1.30,
        "profit": 12.5,
        "timestamp": "2024-01-01T00:00:00Z"
    }]))
    .into_response()
}

async fn bare_stats(headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(stats_payload()).into_response()
}

async fn health(headers: HeaderMap) -> Response {
    if headers.contains_key("authorization") {
        // Public endpoints must not carry a credential
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!({ "status": "ok" })).into_response()
}

fn bare_backend() -> Router {
    Router::new()
        .route("/auth/login-local", post(bare_login))
        .route("/trades/history", get(bare_history))
        .route("/performance/stats", get(bare_stats))
        .route("/health", get(health))
}

// --- enveloped-convention backend --------------------------------------------

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn form_login(Form(form): Form<LoginForm>) -> Response {
    if form.username != "user@example.com" || form.password != "hunter2" {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    // The auth endpoint answers bare even on enveloped deployments
    Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
}

async fn enveloped_stats(headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "success": true,
        "message": "Operation successful",
        "data": stats_payload(),
        "timestamp": "2024-01-01T00:00:00Z"
    }))
    .into_response()
}

async fn enveloped_pause() -> Json<Value> {
    Json(json!({
        "success": false,
        "message": "bot is not running",
        "timestamp": "2024-01-01T00:00:00Z"
    }))
}

async fn enveloped_upload(headers: HeaderMap, mut multipart: Multipart) -> Response {
    if bearer(&headers) != Some(TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let Ok(Some(field)) = multipart.next_field().await else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    if field.name() != Some("file") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let file_name = field.file_name().unwrap_or_default().to_string();
    let Ok(data) = field.bytes().await else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    Json(json!({
        "success": true,
        "message": "Strategy uploaded",
        "data": { "id": "s-1", "file": file_name, "size": data.len() },
        "timestamp": "2024-01-01T00:00:00Z"
    }))
    .into_response()
}

fn enveloped_backend() -> Router {
    Router::new()
        .route("/auth/login/access-token", post(form_login))
        .route("/performance/stats", get(enveloped_stats))
        .route("/bot/pause", post(enveloped_pause))
        .route("/strategies", post(enveloped_upload))
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config_for(url: &str, dir: &TempDir, scheme: AuthScheme) -> BackendConfig {
    BackendConfig::new(url)
        .auth_scheme(scheme)
        .token_cache_path(dir.path().join("token"))
}

// --- tests --------------------------------------------------------------------

#[tokio::test]
async fn json_login_persists_token_and_authenticates_later_calls() {
    let url = spawn(bare_backend()).await;
    let dir = TempDir::new().unwrap();
    let client = build_client(config_for(&url, &dir, AuthScheme::Json)).unwrap();

    let credential = client.auth.login("user@example.com", "hunter2").await.unwrap();
    assert_eq!(credential.access_token, TOKEN);
    assert_eq!(client.tokens().get().as_deref(), Some(TOKEN));

    let trades = client.trading.history(Some(5)).await.unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].trade_type, "BUY");
    assert_eq!(trades[0].entry_price, dec!(1.25));
}

#[tokio::test]
async fn oauth2_form_login_issues_the_same_session() {
    let url = spawn(enveloped_backend()).await;
    let dir = TempDir::new().unwrap();
    let client = build_client(config_for(&url, &dir, AuthScheme::OAuth2Form)).unwrap();

    let credential = client.auth.login("user@example.com", "hunter2").await.unwrap();
    assert_eq!(credential.token_type, "bearer");
    assert_eq!(client.tokens().get().as_deref(), Some(TOKEN));
}

#[tokio::test]
async fn logout_clears_the_shared_persistent_store() {
    let url = spawn(bare_backend()).await;
    let dir = TempDir::new().unwrap();
    let config = config_for(&url, &dir, AuthScheme::Json);

    let client = build_client(config.clone()).unwrap();
    client.auth.login("user@example.com", "hunter2").await.unwrap();

    // A freshly constructed client sharing the cache sees the session
    let sibling = build_client(config.clone()).unwrap();
    assert_eq!(sibling.tokens().get().as_deref(), Some(TOKEN));

    client.auth.logout();

    let fresh_store = TokenStore::from_cache_path(Some(dir.path().join("token")));
    assert_eq!(fresh_store.get(), None);
    let fresh_client = build_client(config).unwrap();
    assert_eq!(fresh_client.tokens().get(), None);
}

#[tokio::test]
async fn enveloped_and_bare_backends_yield_identical_results() {
    let bare_url = spawn(bare_backend()).await;
    let enveloped_url = spawn(enveloped_backend()).await;
    let dir_a = TempDir::new().unwrap();
    let dir_b = TempDir::new().unwrap();

    let bare_client = build_client(config_for(&bare_url, &dir_a, AuthScheme::Json)).unwrap();
    let enveloped_client =
        build_client(config_for(&enveloped_url, &dir_b, AuthScheme::OAuth2Form)).unwrap();

    bare_client.tokens().set(TOKEN);
    enveloped_client.tokens().set(TOKEN);

    let from_bare = bare_client.performance.stats().await.unwrap();
    let from_enveloped = enveloped_client.performance.stats().await.unwrap();

    assert_eq!(from_bare.total_return, dec!(0.42));
    assert_eq!(from_bare.total_return, from_enveloped.total_return);
    assert_eq!(from_bare.sharpe_ratio, from_enveloped.sharpe_ratio);
    assert_eq!(from_bare.total_trades, from_enveloped.total_trades);
}

#[tokio::test]
async fn envelope_rejection_surfaces_the_backend_message() {
    let url = spawn(enveloped_backend()).await;
    let dir = TempDir::new().unwrap();
    let client = build_client(config_for(&url, &dir, AuthScheme::OAuth2Form)).unwrap();
    client.tokens().set(TOKEN);

    let err = client.bot.pause().await.unwrap_err();
    match err {
        ApiError::EnvelopeError(message) => assert_eq!(message, "bot is not running"),
        other => panic!("expected envelope error, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_route_surfaces_the_numeric_status() {
    let url = spawn(bare_backend()).await;
    let dir = TempDir::new().unwrap();
    let client = build_client(config_for(&url, &dir, AuthScheme::Json)).unwrap();
    client.tokens().set(TOKEN);

    let err = client.bot.status().await.unwrap_err();
    match err {
        ApiError::StatusError { status, .. } => assert_eq!(status, 404),
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let dir = TempDir::new().unwrap();
    // Port 9 (discard) is closed on loopback
    let client = build_client(config_for("http://127.0.0.1:9", &dir, AuthScheme::Json)).unwrap();

    let err = client.system.health().await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError(_)));
}

#[tokio::test]
async fn strategy_upload_travels_as_multipart() {
    let url = spawn(enveloped_backend()).await;
    let dir = TempDir::new().unwrap();
    let client = build_client(config_for(&url, &dir, AuthScheme::OAuth2Form)).unwrap();
    client.tokens().set(TOKEN);

    let result = client
        .strategies
        .upload("momentum.py", b"print('strategy')".to_vec())
        .await
        .unwrap();

    assert_eq!(result["id"], "s-1");
    assert_eq!(result["file"], "momentum.py");
    assert_eq!(result["size"], 17);
}

#[tokio::test]
async fn public_endpoints_never_carry_the_credential() {
    let url = spawn(bare_backend()).await;
    let dir = TempDir::new().unwrap();
    let client = build_client(config_for(&url, &dir, AuthScheme::Json)).unwrap();

    // Even with a session in place, the health probe goes out bare
    client.tokens().set(TOKEN);
    let health = client.system.health().await.unwrap();
    assert_eq!(health["status"], "ok");
}
