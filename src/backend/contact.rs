//! `POST /api/contact`: forwards the contact form to Formspree.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::ACCEPT, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::Deserialize;
use tracing::{debug, info};

use super::{error::RelayError, fail, telemetry::resolve_request_id, telemetry::respond, AppState};
use crate::ui::contact::{ContactMessage, RelayReply};

const ENDPOINT: &str = "contact";
const REJECTED_FALLBACK: &str = "Failed to send message";

#[derive(Debug, Default, Deserialize)]
struct FormspreeReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    errors: Vec<FormspreeFieldError>,
}

#[derive(Debug, Deserialize)]
struct FormspreeFieldError {
    #[serde(default)]
    message: Option<String>,
}

impl FormspreeReply {
    fn rejection_message(self) -> String {
        self.error
            .filter(|text| !text.trim().is_empty())
            .or_else(|| self.errors.into_iter().find_map(|field| field.message))
            .unwrap_or_else(|| REJECTED_FALLBACK.to_string())
    }
}

pub async fn contact_relay(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started_at = Instant::now();
    let request_id = resolve_request_id(&headers);
    info!(endpoint = ENDPOINT, request_id = %request_id, "request_start");

    match forward(&state, &body).await {
        Ok(reply) => {
            info!(
                endpoint = ENDPOINT,
                request_id = %request_id,
                status = StatusCode::OK.as_u16(),
                duration_ms = started_at.elapsed().as_millis() as u64,
                "request_complete"
            );
            respond(StatusCode::OK, Json(reply), &request_id)
        }
        Err(error) => fail(ENDPOINT, &request_id, started_at, error),
    }
}

/// The upstream `ok` flag decides success; its HTTP status is only logged.
async fn forward(state: &AppState, body: &[u8]) -> Result<RelayReply, RelayError> {
    let message: ContactMessage = serde_json::from_slice(body).map_err(RelayError::internal)?;
    if !message.is_complete() {
        return Err(RelayError::MissingFields);
    }

    let response = state
        .http
        .post(state.config.formspree_endpoint.clone())
        .header(ACCEPT, "application/json")
        .json(&message)
        .send()
        .await
        .map_err(RelayError::internal)?;

    let status = response.status();
    let verdict = response
        .json::<FormspreeReply>()
        .await
        .map_err(RelayError::internal)?;
    debug!(endpoint = ENDPOINT, upstream_status = status.as_u16(), ok = verdict.ok, "upstream_verdict");

    if verdict.ok {
        return Ok(RelayReply {
            ok: true,
            error: None,
        });
    }

    Err(RelayError::Upstream {
        status: Some(status.as_u16()),
        message: verdict.rejection_message(),
    })
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{send, state};
    use axum::http::StatusCode;
    use httpmock::prelude::*;
    use serde_json::json;

    const VALID: &str =
        r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"Line one\nLine two"}"#;

    #[tokio::test]
    async fn forwards_payload_unmodified_and_returns_ok() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/f/test-form")
                    .header("accept", "application/json")
                    .json_body(json!({
                        "name": "Ada",
                        "email": "ada@example.com",
                        "subject": "Hi",
                        "message": "Line one\nLine two",
                    }));
                then.status(200).json_body(json!({ "ok": true, "next": "/thanks" }));
            })
            .await;

        let (status, headers, body) = send(state(&server.base_url(), None), "POST", "/api/contact", VALID).await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true }));
        assert_eq!(headers["cache-control"], "no-store");
    }

    #[tokio::test]
    async fn missing_message_is_rejected_before_any_upstream_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let (status, _, body) = send(
            state(&server.base_url(), None),
            "POST",
            "/api/contact",
            r#"{"name":"Ada","email":"ada@example.com","subject":"Hi","message":"   "}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn null_field_counts_as_missing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(json!({ "ok": true }));
            })
            .await;

        let (status, _, body) = send(
            state(&server.base_url(), None),
            "POST",
            "/api/contact",
            r#"{"name":null,"email":"ada@example.com","subject":"Hi","message":"x"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn upstream_rejection_text_is_passed_through() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/f/test-form");
                then.status(422).json_body(json!({
                    "error": "",
                    "errors": [{ "field": "email", "message": "should be an email" }]
                }));
            })
            .await;

        let (status, _, body) = send(state(&server.base_url(), None), "POST", "/api/contact", VALID).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "should be an email");
    }

    #[tokio::test]
    async fn upstream_verdict_wins_over_http_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/f/test-form");
                then.status(200).json_body(json!({ "ok": false }));
            })
            .await;

        let (status, _, body) = send(state(&server.base_url(), None), "POST", "/api/contact", VALID).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send message");
    }

    #[tokio::test]
    async fn malformed_body_is_an_internal_error() {
        let (status, _, body) = send(state("http://127.0.0.1:9", None), "POST", "/api/contact", "{not json").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn unreachable_upstream_is_an_internal_error() {
        let (status, _, body) = send(state("http://127.0.0.1:9", None), "POST", "/api/contact", VALID).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
