use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing_subscriber::EnvFilter;

use super::config::LogLevel;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// One JSON object per line on stdout. `RUST_LOG` overrides `LOG_LEVEL`.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", level.as_str())));

    let _ = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_target(false)
        .with_env_filter(filter)
        .try_init();
}

fn now_unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|value| value.as_millis())
        .unwrap_or(0)
}

fn generate_request_id() -> String {
    let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{counter}", now_unix_millis())
}

pub fn resolve_request_id(headers: &HeaderMap) -> String {
    let value = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|raw| raw.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string);

    value.unwrap_or_else(generate_request_id)
}

/// Relay responses are never cacheable and always echo the request id.
pub fn respond(status: StatusCode, payload: impl IntoResponse, request_id: &str) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    if let Ok(request_id_header) = HeaderValue::from_str(request_id) {
        headers.insert(REQUEST_ID_HEADER, request_id_header);
    }
    (status, headers, payload).into_response()
}
