//! Liveness and status endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use tracing::debug;

use crate::AppState;

/// `GET /`
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "status": "online",
        "service": "api-gateway",
    }))
}

/// `GET /status`
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    let websocket = state.connections.count().await;
    Json(json!({
        "status": "operational",
        "connections": {
            "websocket": websocket,
        }
    }))
}

/// `GET /health`
///
/// Reports the dialogue manager as a dependency; 503 when it is down.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");

    let dialogue_status = if state.chat.dialogue().is_reachable().await {
        "UP"
    } else {
        "DOWN"
    };

    let response = json!({
        "status": dialogue_status,
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "dialogueManager": { "status": dialogue_status },
        },
    });

    let status = if dialogue_status == "DOWN" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (status, Json(response))
}
