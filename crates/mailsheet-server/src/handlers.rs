//! HTTP request handlers for the webhook server.
//!
//! Implements the event webhook and health check endpoints using axum.

use crate::orchestrator::{Orchestrator, OrchestratorError, WebhookOutcome};
use crate::webhook::WebhookPayload;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Event processing
    pub orchestrator: Arc<Orchestrator>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Overall health status
    pub status: String,
    /// Distinct events remembered by the gate
    pub processed_events: usize,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Body is not a usable webhook payload
    BadPayload(String),
    /// Event could not be processed
    Orchestrator(OrchestratorError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match self {
            AppError::BadPayload(msg) => msg,
            AppError::Orchestrator(e) => e.to_string(),
        };
        warn!("Rejecting webhook: {}", message);

        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<OrchestratorError> for AppError {
    fn from(e: OrchestratorError) -> Self {
        AppError::Orchestrator(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadPayload(e.body_text())
    }
}

fn status(status: &str) -> Json<Value> {
    Json(json!({ "status": status }))
}

/// POST /webhook - Handle a platform event
async fn webhook(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(body) = body?;
    let payload =
        WebhookPayload::from_json(body).map_err(|e| AppError::BadPayload(e.to_string()))?;

    let response = match state.orchestrator.handle(payload).await? {
        WebhookOutcome::Challenge(challenge) => Json(json!({ "challenge": challenge })),
        WebhookOutcome::Duplicate => status("duplicate"),
        WebhookOutcome::Ignored { .. } => status("ignored"),
        WebhookOutcome::Processed(_) => status("success"),
    };

    Ok(response)
}

/// GET /health - Liveness and processed-event count
async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        processed_events: state.orchestrator.processed_events(),
    })
}

/// Create the axum router with all routes
pub fn create_router(state: AppState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(webhook))
        .route("/health", get(health_check))
        .with_state(state)
}
