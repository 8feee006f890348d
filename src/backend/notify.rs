//! `POST /api/send-email`: turns the contact form into an email sent through
//! the Resend API.

use std::time::Instant;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{error::RelayError, fail, telemetry::resolve_request_id, telemetry::respond, AppState};
use crate::ui::contact::ContactMessage;

const ENDPOINT: &str = "send_email";
const SUBJECT_PREFIX: &str = "New Contact Form Submission: ";

#[derive(Debug, Serialize)]
struct OutboundEmail<'a> {
    from: &'a str,
    to: &'a str,
    reply_to: &'a str,
    subject: String,
    html: String,
}

#[derive(Debug, Deserialize)]
struct ResendReply {
    id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReply {
    pub success: bool,
    pub message: &'static str,
    pub email_id: String,
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Every submitted field is escaped before it reaches the markup.
pub fn render_email_html(message: &ContactMessage) -> String {
    let name = escape_html(&message.name);
    let email = escape_html(&message.email);
    let subject = escape_html(&message.subject);
    let body = escape_html(&message.message)
        .replace("\r\n", "\n")
        .replace('\n', "<br>");

    format!(
        "<h2>New Message from {name}</h2>\n\
         <p><strong>From:</strong> {name} ({email})</p>\n\
         <p><strong>Subject:</strong> {subject}</p>\n\
         <h3>Message:</h3>\n\
         <p>{body}</p>\n"
    )
}

pub async fn notify_relay(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started_at = Instant::now();
    let request_id = resolve_request_id(&headers);
    info!(endpoint = ENDPOINT, request_id = %request_id, "request_start");

    match send_email(&state, &body).await {
        Ok(reply) => {
            info!(
                endpoint = ENDPOINT,
                request_id = %request_id,
                status = StatusCode::OK.as_u16(),
                email_id = %reply.email_id,
                duration_ms = started_at.elapsed().as_millis() as u64,
                "request_complete"
            );
            respond(StatusCode::OK, Json(reply), &request_id)
        }
        Err(error) => fail(ENDPOINT, &request_id, started_at, error),
    }
}

async fn send_email(state: &AppState, body: &[u8]) -> Result<NotifyReply, RelayError> {
    let message: ContactMessage = serde_json::from_slice(body).map_err(RelayError::internal)?;
    if !message.is_complete() {
        return Err(RelayError::MissingFields);
    }

    let api_key = state.config.require_resend_api_key()?;
    let endpoint = state
        .config
        .resend_api_url
        .join("emails")
        .map_err(RelayError::internal)?;

    let email = OutboundEmail {
        from: &state.config.email_from,
        to: &state.config.email_to,
        reply_to: &message.email,
        subject: format!("{SUBJECT_PREFIX}{}", message.subject),
        html: render_email_html(&message),
    };

    let response = state
        .http
        .post(endpoint)
        .bearer_auth(api_key)
        .json(&email)
        .send()
        .await
        .map_err(RelayError::internal)?;

    let status = response.status();
    if !status.is_success() {
        let upstream_body = response.text().await.unwrap_or_default();
        warn!(
            endpoint = ENDPOINT,
            upstream_status = status.as_u16(),
            upstream_body = %upstream_body,
            "upstream_rejected"
        );
        return Err(RelayError::Upstream {
            status: Some(status.as_u16()),
            message: "Failed to send email".to_string(),
        });
    }

    let reply = response
        .json::<ResendReply>()
        .await
        .map_err(RelayError::internal)?;

    Ok(NotifyReply {
        success: true,
        message: "Message sent successfully!",
        email_id: reply.id,
    })
}
