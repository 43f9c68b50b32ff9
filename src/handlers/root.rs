// handlers/root.rs - GET / handler

use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::ApiResponse;

pub async fn root(State(state): State<AppState>) -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "name": state.config.server.server_name,
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Multi-user todo backend with bearer-token sessions",
        "endpoints": {
            "home": "/ (public)",
            "health": "/health, /api/v1/health-check (public)",
            "query": "/api/v1/query (signUp, signIn, refreshSession public; everything else requires a bearer token)",
        }
    }))
}
