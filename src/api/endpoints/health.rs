//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::config::APP_VERSION;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub services: ServiceStatus,
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub http: &'static str,
    pub vector_index: &'static str,
    pub cloud_ocr: &'static str,
    pub classifier: &'static str,
}

/// `GET /health` — status of the API and its collaborators.
///
/// The vector index is the one dependency every endpoint leans on, so its
/// reachability decides the status code: 200 when connected, 503 when not.
/// OCR and classifier availability are reported but informational.
pub async fn check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let probe_state = state.clone();
    let index_connected = tokio::task::spawn_blocking(move || probe_state.index_connected())
        .await
        .unwrap_or(false);

    let response = HealthResponse {
        status: if index_connected { "healthy" } else { "degraded" },
        services: ServiceStatus {
            http: "running",
            vector_index: if index_connected { "connected" } else { "disconnected" },
            cloud_ocr: if state.arbiter.has_cloud() {
                "configured"
            } else {
                "not_configured"
            },
            classifier: if state.classifier.is_some() {
                "loaded"
            } else {
                "unavailable"
            },
        },
        version: APP_VERSION,
    };

    let code = if index_connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (code, Json(response))
}
