//! Health check HTTP handler

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::web::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub tracked_files: usize,
    pub total_size_bytes: u64,
    pub max_size_bytes: u64,
    pub max_count: usize,
}

/// Liveness plus current store usage against its quota
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.store.stats().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        tracked_files: stats.total_files,
        total_size_bytes: stats.total_size_bytes,
        max_size_bytes: stats.max_size_bytes,
        max_count: stats.max_count,
    })
}
