//! HTTP side of the site: three stateless relay endpoints plus the static
//! build of the wasm client.

pub mod config;
pub mod contact;
pub mod error;
pub mod notify;
pub mod telemetry;
pub mod visitor;

use std::{sync::Arc, time::Instant};

use axum::{
    http::{HeaderMap, Method, Uri},
    response::Response,
    routing::post,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{info, warn};

use config::RelayConfig;
use error::RelayError;
use telemetry::{resolve_request_id, respond};

const USER_AGENT: &str = "portfolio-relay/1.0";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let static_service =
        ServeDir::new(&static_dir).not_found_service(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .route(
            "/api/contact",
            post(contact::contact_relay).fallback(method_not_allowed),
        )
        .route(
            "/api/send-email",
            post(notify::notify_relay).fallback(method_not_allowed),
        )
        .route(
            "/api/log-visitor",
            post(visitor::log_visitor).fallback(method_not_allowed),
        )
        .fallback_service(static_service)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    let config = RelayConfig::from_env();
    telemetry::init(config.log_level);

    if config.resend_api_key.is_none() {
        warn!(
            error_class = "config_missing",
            "RESEND_API_KEY not set; /api/send-email will answer 500"
        );
    }

    let bind_address = format!("0.0.0.0:{}", config.port);
    let state = AppState::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "server_listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server_stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown_signal_received");
}

async fn method_not_allowed(method: Method, uri: Uri, headers: HeaderMap) -> Response {
    let request_id = resolve_request_id(&headers);
    info!(
        request_id = %request_id,
        method = %method,
        path = uri.path(),
        error_class = "method_not_allowed",
        "request_rejected"
    );
    let error = RelayError::MethodNotAllowed;
    respond(error.status(), error, &request_id)
}

/// Logs the failure with its private detail and renders the public envelope.
fn fail(endpoint: &'static str, request_id: &str, started_at: Instant, error: RelayError) -> Response {
    let status = error.status();
    if status.is_server_error() {
        warn!(
            endpoint,
            request_id,
            status = status.as_u16(),
            error_class = error.error_class(),
            message = %error.detail(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "request_failed"
        );
    } else {
        info!(
            endpoint,
            request_id,
            status = status.as_u16(),
            error_class = error.error_class(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "request_failed"
        );
    }

    respond(status, error, request_id)
}
