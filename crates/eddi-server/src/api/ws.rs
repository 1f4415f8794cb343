//! Realtime echo channel

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::AppState;

/// Connected WebSocket clients, with the number of open sockets per client id
#[derive(Debug, Clone, Default)]
pub struct WsConnections {
    clients: Arc<RwLock<HashMap<String, usize>>>,
}

impl WsConnections {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more open socket for a client
    pub async fn register(&self, client_id: &str) {
        *self.clients.write().await.entry(client_id.to_string()).or_insert(0) += 1;
    }

    /// Record one closed socket; the client is gone once its last socket closes
    pub async fn unregister(&self, client_id: &str) {
        let mut clients = self.clients.write().await;
        if let Some(open) = clients.get_mut(client_id) {
            *open -= 1;
            if *open == 0 {
                clients.remove(client_id);
            }
        }
    }

    /// Number of distinct connected clients
    pub async fn count(&self) -> usize {
        self.clients.read().await.len()
    }
}

/// Reply to one inbound frame; `None` when the frame is not JSON
pub fn echo_frame(frame: &str) -> Option<Value> {
    let message: Value = serde_json::from_str(frame).ok()?;
    Some(echo(&message))
}

fn echo(message: &Value) -> Value {
    let text = message.get("text").and_then(Value::as_str).unwrap_or_default();
    json!({
        "type": "response",
        "text": format!("Echo: {}", text),
        "timestamp": message.get("timestamp").cloned().unwrap_or(Value::Null),
    })
}

/// `POST /api/message`
pub async fn echo_message(Json(message): Json<Value>) -> impl IntoResponse {
    Json(echo(&message))
}

/// `GET /ws/:client_id`
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(client_id): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| serve_socket(socket, client_id, state))
}

async fn serve_socket(mut socket: WebSocket, client_id: String, state: AppState) {
    state.connections.register(&client_id).await;
    info!(client_id = %client_id, "WebSocket client connected");

    while let Some(frame) = socket.recv().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                warn!(client_id = %client_id, error = %e, "WebSocket receive failed");
                break;
            }
        };

        match frame {
            Message::Text(text) => {
                let Some(reply) = echo_frame(&text) else {
                    warn!(client_id = %client_id, "Skipping frame that is not JSON");
                    continue;
                };
                debug!(client_id = %client_id, "Echoing frame");
                if let Err(e) = socket.send(Message::Text(reply.to_string())).await {
                    warn!(client_id = %client_id, error = %e, "WebSocket send failed");
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.connections.unregister(&client_id).await;
    info!(client_id = %client_id, "WebSocket client disconnected");
}
