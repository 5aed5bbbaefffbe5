//! Health check handlers.

use axum::extract::State;
use axum::Json;
use framehue_models::HealthStatus;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Frame source availability (FFmpeg/FFprobe on PATH).
pub async fn video_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.service.health().await)
}
