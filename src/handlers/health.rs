// handlers/health.rs - GET /health and GET /api/v1/health-check handlers

use axum::{extract::State, http::StatusCode};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::ApiResponse;

/// Store health as JSON; 503 when the backend does not answer
pub async fn health(State(state): State<AppState>) -> ApiResponse<Value> {
    let now = chrono::Utc::now();

    match state.store.health.health_check().await {
        Ok(()) => ApiResponse::success(json!({
            "status": "ok",
            "timestamp": now,
            "database": "ok"
        })),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiResponse::with_status(
                json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }),
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}

/// Liveness probe: the configured server name as plain text
pub async fn health_check(State(state): State<AppState>) -> String {
    state.config.server.server_name.clone()
}
