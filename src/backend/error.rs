use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use super::config::ConfigError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Every way a relay request can fail.
///
/// `Display` is the exact text sent back in the `error` field, so internal
/// detail lives in `source` and only reaches the logs.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Email service not configured. Please contact administrator.")]
    NotConfigured(#[from] ConfigError),

    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("{public}")]
    Internal {
        public: &'static str,
        #[source]
        source: BoxError,
    },
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl RelayError {
    pub fn internal(source: impl Into<BoxError>) -> Self {
        Self::Internal {
            public: "Internal server error",
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::NotConfigured(_) | Self::Upstream { .. } | Self::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable tag for log events.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method_not_allowed",
            Self::MissingFields => "validation",
            Self::NotConfigured(_) => "config_missing",
            Self::Upstream { .. } => "upstream_rejected",
            Self::Internal { .. } => "internal",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::NotConfigured(inner) => inner.to_string(),
            Self::Internal { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
