//! `POST /api/log-visitor`: writes the visitor record to the log and nothing else.

use std::time::Instant;

use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::Serialize;
use tracing::info;

use super::{error::RelayError, fail, telemetry::resolve_request_id, telemetry::respond};
use crate::visit::VisitorRecord;

const ENDPOINT: &str = "log_visitor";

#[derive(Debug, Serialize)]
pub struct VisitorLogged {
    pub success: bool,
    pub message: &'static str,
}

pub async fn log_visitor(headers: HeaderMap, body: Bytes) -> Response {
    let started_at = Instant::now();
    let request_id = resolve_request_id(&headers);

    let record = match serde_json::from_slice::<VisitorRecord>(&body) {
        Ok(record) => record,
        Err(error) => {
            let error = RelayError::Internal {
                public: "Failed to log visitor",
                source: error.into(),
            };
            return fail(ENDPOINT, &request_id, started_at, error);
        }
    };

    info!(
        endpoint = ENDPOINT,
        request_id = %request_id,
        ip = %record.ip,
        timestamp = %record.timestamp,
        url = %record.url,
        user_agent = %record.user_agent,
        "visitor_logged"
    );

    respond(
        StatusCode::OK,
        Json(VisitorLogged {
            success: true,
            message: "Visitor IP logged successfully",
        }),
        &request_id,
    )
}
