//! HTTP surface: the form submission endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{Bytes, to_bytes};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::pipeline::{ClientContext, Relay, Submission};

/// Largest accepted submission body.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state for relay routes.
#[derive(Clone)]
struct AppState {
    relay: Arc<Relay>,
}

/// Build the Axum router for the relay.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// peer address is known when no `X-Forwarded-For` header is sent.
pub fn relay_routes(relay: Arc<Relay>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route(
            "/api/notify",
            post(notify)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .layer(cors)
        .with_state(AppState { relay })
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "form-relay"
    }))
}

// ── Notify ──────────────────────────────────────────────────────────────

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, HeaderValue::from_static("POST, OPTIONS"))],
        Json(serde_json::json!({"error": "Method Not Allowed"})),
    )
        .into_response()
}

async fn notify(State(state): State<AppState>, request: Request) -> Response {
    let captured_at = Utc::now();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());
    let (parts, body) = request.into_parts();

    let raw = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Could not read submission body");
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(serde_json::json!({"error": "Unreadable or oversized body"})),
            )
                .into_response();
        }
    };

    let Some(submission) = Submission::parse(&read_message(&parts.headers, &raw)) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Missing message"})),
        )
            .into_response();
    };

    let client = ClientContext::new(
        peer,
        header_string(&parts.headers, "x-forwarded-for"),
        header_string(&parts.headers, header::USER_AGENT.as_str()),
        captured_at,
    );

    let outcome = state.relay.submit(&submission, &client).await;

    let status = if outcome.ok {
        StatusCode::OK
    } else {
        StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::BAD_GATEWAY)
    };
    (
        status,
        Json(serde_json::json!({"ok": outcome.ok, "full": outcome.body})),
    )
        .into_response()
}

/// Submission text: the `message` field of a JSON body, or the raw body.
///
/// A JSON content type with an unparseable body falls back to the raw text.
fn read_message(headers: &HeaderMap, raw: &Bytes) -> String {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    if is_json {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(raw) {
            return value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string();
        }
    }
    String::from_utf8_lossy(raw).into_owned()
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
