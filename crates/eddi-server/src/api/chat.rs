//! Chat relay endpoints

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use eddi_core::Button;

use super::errors::ApiError;
use crate::chat_service::ChatReply;
use crate::conversation_store::HistoryEntry;
use crate::error::ServerError;
use crate::AppState;

fn default_user_id() -> String {
    "anonymous".to_string()
}

/// Inbound user message
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRequest {
    /// Message text
    pub message: String,

    /// Sender
    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Conversation to continue
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Assistant side of a turn
#[derive(Debug, Clone, Serialize)]
pub struct AssistantMessage {
    /// Always `assistant`
    pub role: &'static str,
    /// Reply text
    pub content: String,
    /// Quick-reply buttons
    pub buttons: Vec<Button>,
}

/// Reply shape used by the conversation endpoints
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Assistant reply
    pub message: AssistantMessage,
    /// Conversation id
    pub conversation_id: String,
}

impl From<ChatReply> for MessageResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            message: AssistantMessage {
                role: "assistant",
                content: reply.response,
                buttons: reply.buttons,
            },
            conversation_id: reply.conversation_id,
        }
    }
}

/// Stored history of one conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatHistory {
    /// Conversation id
    pub conversation_id: String,
    /// Entries in order
    pub messages: Vec<HistoryEntry>,
}

/// `POST /api/chat/send`
pub async fn send_message(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Json<ChatReply> {
    let reply = state
        .chat
        .process_message(&request.message, &request.user_id, request.conversation_id)
        .await;
    Json(reply)
}

/// `POST /api/chat/new`
pub async fn new_conversation(
    State(state): State<AppState>,
    Json(request): Json<MessageRequest>,
) -> Json<MessageResponse> {
    let reply = state
        .chat
        .process_message(&request.message, &request.user_id, request.conversation_id)
        .await;
    info!(conversation_id = %reply.conversation_id, "Conversation started");
    Json(reply.into())
}

/// `POST /api/chat/:conversation_id`
pub async fn continue_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
    Json(request): Json<MessageRequest>,
) -> Json<MessageResponse> {
    let reply = state
        .chat
        .process_message(&request.message, &request.user_id, Some(conversation_id))
        .await;
    Json(reply.into())
}

/// `GET /api/chat/conversations/:conversation_id`
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<Json<ChatHistory>, ApiError> {
    let messages = state.chat.history(&conversation_id).await?;
    Ok(Json(ChatHistory {
        conversation_id,
        messages,
    }))
}

/// `GET /api/chat/conversations`
pub async fn list_conversations(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.chat.store().summaries().await)
}

/// `DELETE /api/chat/conversations/:conversation_id`
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(conversation_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.chat.store().delete(&conversation_id).await {
        return Err(ServerError::NotFound(format!("Conversation {}", conversation_id)).into());
    }

    info!(conversation_id = %conversation_id, "Conversation deleted");
    Ok(Json(json!({
        "status": "success",
        "message": format!("Conversation {} deleted", conversation_id),
    })))
}
