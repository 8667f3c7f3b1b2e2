use crate::core::errors::ApiError;
use crate::gateway::{headers, GatewayState};
use axum::body::{Body, Bytes};
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, error};

/// CORS headers attached to every gateway response, success or failure.
const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Methods",
        "GET, POST, PUT, DELETE, PATCH, OPTIONS",
    ),
    ("Access-Control-Allow-Headers", "Content-Type, Authorization"),
];

/// CORS preflight handler. A pure constant: no upstream call, ever.
pub async fn preflight() -> Response {
    let mut builder = Response::builder().status(StatusCode::OK);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::empty())
        .unwrap_or_else(|_| StatusCode::OK.into_response())
}

/// Forward one inbound request to the backend and relay the response.
///
/// The gateway is the trust boundary between the browser and an
/// unpredictable remote: any failure in here (malformed target, network
/// error, unreachable upstream) is caught and converted into a fixed 500
/// with a `{"error", "message"}` body. Nothing escapes unhandled.
pub async fn forward(
    State(state): State<GatewayState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match proxy(&state, &path, query.as_deref(), &method, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            error!(%method, path = %path, error = %e, "proxy dispatch failed");
            error_response(&e)
        }
    }
}

async fn proxy(
    state: &GatewayState,
    path: &str,
    query: Option<&str>,
    method: &Method,
    inbound_headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    // Path bytes go through untouched; re-encoding would change what the
    // backend receives.
    let target = match query {
        Some(query) if !query.is_empty() => {
            format!("{}/{}?{}", state.backend_url, path, query)
        }
        _ => format!("{}/{}", state.backend_url, path),
    };

    debug!(%method, %target, "forwarding request");

    let upstream_method = reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| ApiError::Other(format!("unsupported method: {}", e)))?;

    let mut request = state.http.request(upstream_method, &target);

    for (name, value) in headers::filter_headers(&collect_headers(inbound_headers)) {
        request = request.header(&name, &value);
    }

    // Absent or unreadable bodies forward as empty, never as an error
    let carries_body =
        *method == Method::POST || *method == Method::PUT || *method == Method::PATCH;
    if carries_body {
        request = request.body(body.to_vec());
    }

    let upstream = request.send().await?;

    let status = upstream.status().as_u16();
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let body_text = upstream.text().await?;

    relay(status, &content_type, body_text)
}

/// Flatten the inbound header map into name/value string pairs. Values that
/// are not valid UTF-8 cannot be replayed and are skipped.
fn collect_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn relay(status: u16, content_type: &str, body: String) -> Result<Response, ApiError> {
    let status = StatusCode::from_u16(status)
        .map_err(|e| ApiError::Other(format!("invalid upstream status: {}", e)))?;

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type);
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }

    builder
        .body(Body::from(body))
        .map_err(|e| ApiError::Other(format!("failed to assemble relay response: {}", e)))
}

fn error_response(error: &ApiError) -> Response {
    let body = json!({
        "error": "Proxy error",
        "message": error.to_string(),
    })
    .to_string();

    let mut builder = Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json");
    for (name, value) in CORS_HEADERS {
        builder = builder.header(name, value);
    }

    builder
        .body(Body::from(body))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}
