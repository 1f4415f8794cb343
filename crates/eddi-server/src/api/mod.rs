//! HTTP and WebSocket routes for the EDDI server

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod chat;
pub mod download;
pub mod errors;
pub mod health;
pub mod webhook;
pub mod ws;

use crate::AppState;

/// Build the router for every endpoint
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Gateway status
        .route("/", get(health::root))
        .route("/status", get(health::status))
        .route("/health", get(health::health_check))

        // Echo
        .route("/api/message", post(ws::echo_message))
        .route("/ws/:client_id", get(ws::websocket_handler))

        // Chat relay
        .route("/api/chat/send", post(chat::send_message))
        .route("/api/chat/new", post(chat::new_conversation))
        .route("/api/chat/conversations", get(chat::list_conversations))
        .route(
            "/api/chat/conversations/:conversation_id",
            get(chat::get_conversation).delete(chat::delete_conversation),
        )
        .route("/api/chat/:conversation_id", post(chat::continue_conversation))

        // Artifacts
        .route("/download/:file_name", get(download::download_file))

        // Action server
        .route("/webhook", post(webhook::run_action))

        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
