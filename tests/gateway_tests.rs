use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tradebridge::gateway::{router, GatewayState};

#[derive(Clone)]
struct UpstreamState {
    hits: Arc<AtomicUsize>,
}

/// Upstream stub that reflects everything it receives back as JSON.
async fn echo(
    State(state): State<UpstreamState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let header_map: serde_json::Map<String, Value> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), Value::String(v.to_string())))
        })
        .collect();

    Json(json!({
        "method": method.as_str(),
        "path": path,
        "query": query,
        "headers": header_map,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn missing() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [("content-type", "text/plain")],
        "nothing here",
    )
}

async fn spawn_upstream() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/missing", any(missing))
        .route("/{*path}", any(echo))
        .with_state(UpstreamState {
            hits: Arc::clone(&hits),
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), hits)
}

async fn spawn_gateway(backend_url: &str) -> String {
    let app = router(GatewayState::new(backend_url));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn forwards_path_and_query_for_every_method() {
    let (upstream_url, _) = spawn_upstream().await;
    let gateway_url = spawn_gateway(&upstream_url).await;
    let client = reqwest::Client::new();

    for method in [
        reqwest::Method::GET,
        reqwest::Method::POST,
        reqwest::Method::PUT,
        reqwest::Method::DELETE,
        reqwest::Method::PATCH,
    ] {
        let response = client
            .request(method.clone(), format!("{}/a/b?x=1", gateway_url))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200, "method {}", method);
        let echoed: Value = response.json().await.unwrap();
        assert_eq!(echoed["method"], method.as_str());
        assert_eq!(echoed["path"], "a/b");
        assert_eq!(echoed["query"], "x=1");
    }
}

#[tokio::test]
async fn inbound_host_header_is_not_replayed() {
    let (upstream_url, _) = spawn_upstream().await;
    let gateway_url = spawn_gateway(&upstream_url).await;

    let response = reqwest::Client::new()
        .get(format!("{}/probe", gateway_url))
        .header("X-Probe", "forwarded")
        .send()
        .await
        .unwrap();

    let echoed: Value = response.json().await.unwrap();

    // The host seen upstream is the upstream's own authority, never the
    // gateway's inbound one
    let upstream_authority = upstream_url.strip_prefix("http://").unwrap();
    assert_eq!(echoed["headers"]["host"], upstream_authority);
    assert_eq!(echoed["headers"]["x-probe"], "forwarded");
}

#[tokio::test]
async fn empty_post_body_forwards_as_empty() {
    let (upstream_url, _) = spawn_upstream().await;
    let gateway_url = spawn_gateway(&upstream_url).await;

    let response = reqwest::Client::new()
        .post(format!("{}/submit", gateway_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["body"], "");
    assert_eq!(echoed["headers"]["content-type"], "application/json");
}

#[tokio::test]
async fn multipart_content_type_is_preserved_across_the_hop() {
    let (upstream_url, _) = spawn_upstream().await;
    let gateway_url = spawn_gateway(&upstream_url).await;

    let content_type = "multipart/form-data; boundary=xyz";
    let response = reqwest::Client::new()
        .post(format!("{}/upload", gateway_url))
        .header("Content-Type", content_type)
        .body("--xyz--")
        .send()
        .await
        .unwrap();

    let echoed: Value = response.json().await.unwrap();
    assert_eq!(echoed["headers"]["content-type"], content_type);
    assert_eq!(echoed["body"], "--xyz--");
}

#[tokio::test]
async fn options_preflight_never_reaches_the_upstream() {
    let (upstream_url, hits) = spawn_upstream().await;
    let gateway_url = spawn_gateway(&upstream_url).await;

    let response = reqwest::Client::new()
        .request(
            reqwest::Method::OPTIONS,
            format!("{}/anything/at/all", gateway_url),
        )
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-methods")
            .unwrap(),
        "GET, POST, PUT, DELETE, PATCH, OPTIONS"
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-headers")
            .unwrap(),
        "Content-Type, Authorization"
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn upstream_status_and_body_are_relayed_verbatim() {
    let (upstream_url, _) = spawn_upstream().await;
    let gateway_url = spawn_gateway(&upstream_url).await;

    let response = reqwest::Client::new()
        .get(format!("{}/missing", gateway_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
    assert_eq!(response.text().await.unwrap(), "nothing here");
}

#[tokio::test]
async fn unreachable_backend_becomes_a_500_proxy_error() {
    // Port 9 (discard) is closed on loopback
    let gateway_url = spawn_gateway("http://127.0.0.1:9").await;

    let response = reqwest::Client::new()
        .get(format!("{}/bot/status", gateway_url))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Proxy error");
    assert!(body["message"].as_str().unwrap().len() > 0);
}
