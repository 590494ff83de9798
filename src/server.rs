//! HTTP API.
//!
//! Endpoints:
//! - GET /health - liveness check, returns `{"ok": true}`
//! - POST /api/transcribe - body `{url, options: {language, autoLanguageDetection}}`,
//!   returns `{transcript, language, duration, source}`
//!
//! Request errors (missing URL, source too long, malformed body) answer 400,
//! everything else 500, both with an `{error}` body.

use crate::defaults;
use crate::error::{Result, VidscribeError};
use crate::service::TranscriptionService;
use crate::types::TranscribeOptions;
use axum::{
    Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Body of `POST /api/transcribe`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TranscribeRequest {
    pub url: Option<String>,
    pub options: TranscribeOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type AppState = Arc<TranscriptionService>;

/// Builds the API router around a shared service.
pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/transcribe", post(transcribe))
        .layer(DefaultBodyLimit::max(defaults::MAX_REQUEST_BODY_BYTES))
        .with_state(service)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

async fn transcribe(
    State(service): State<AppState>,
    payload: std::result::Result<Json<TranscribeRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection, "Rejected request body");
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let url = request.url.unwrap_or_default();
    match service.transcribe(&url, &request.options).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) if e.is_client_error() => {
            warn!(url, error = %e, "Rejected transcription request");
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => {
            error!(url, error = %e, "Transcription failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Serves the API on `addr` until Ctrl-C.
pub async fn serve(service: AppState, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| VidscribeError::Other(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
