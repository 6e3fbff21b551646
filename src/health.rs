use crate::api::AppState;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Liveness response. Always served with 200; it says nothing about whether
/// the encoder would succeed for a given request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Server version
    pub version: String,
    pub uptime_secs: u64,
}

impl HealthResponse {
    pub fn alive(started_at: Instant) -> Self {
        Self {
            status: "UP".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: started_at.elapsed().as_secs(),
        }
    }
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Axum handler for `GET /api/health`
pub async fn liveness_handler(State(state): State<AppState>) -> HealthResponse {
    HealthResponse::alive(state.started_at())
}
