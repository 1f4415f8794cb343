//! Action server webhook called by the dialogue manager

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use eddi_actions::DispatchError;
use eddi_core::Tracker;

use crate::AppState;

/// Body of a webhook call
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    /// Action to run
    pub next_action: String,

    /// Conversation the call belongs to
    #[serde(default)]
    pub sender_id: Option<String>,

    /// Conversation state
    #[serde(default)]
    pub tracker: Tracker,

    /// Dialogue domain; unused by the actions
    #[serde(default)]
    pub domain: Value,
}

/// `POST /webhook`
pub async fn run_action(
    State(state): State<AppState>,
    Json(request): Json<WebhookRequest>,
) -> impl IntoResponse {
    let mut tracker = request.tracker;
    if tracker.sender_id.is_empty() {
        if let Some(sender_id) = request.sender_id {
            tracker.sender_id = sender_id;
        }
    }

    match state.actions.dispatch(&request.next_action, &tracker).await {
        Ok(response) => (StatusCode::OK, Json(json!(response))),
        Err(err @ DispatchError::UnknownAction(_)) => {
            warn!(action = %request.next_action, "Unknown action requested");
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": err.to_string(),
                    "action_name": request.next_action,
                })),
            )
        }
    }
}
