//! Message relay
//!
//! One turn: forward the user message to the dialogue manager, fold the
//! replies into a single assistant message, persist any download artifact,
//! then record both sides in the conversation history.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info_span, warn, Instrument};

use eddi_core::{BotMessage, Button};

use crate::conversation_store::{ConversationStore, HistoryEntry};
use crate::dialogue::DialogueClient;
use crate::downloads::DownloadDir;
use crate::error::{ServerError, ServerResult};

/// Reply used when the dialogue manager cannot be reached
pub const UNAVAILABLE_REPLY: &str = "Sorry, I'm having trouble processing your request.";

/// Reply used when the dialogue manager answered without any text
pub const FALLBACK_REPLY: &str = "I'm not sure how to respond to that.";

const DOWNLOAD_TEXT: &str = "Download file";

/// Result of one relayed turn
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    /// Joined reply text
    pub response: String,
    /// Buttons from every reply
    pub buttons: Vec<Button>,
    /// Merged structured payloads
    pub custom: Map<String, Value>,
    /// Conversation the turn belongs to
    pub conversation_id: String,
    /// When the turn was relayed
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Folded {
    texts: Vec<String>,
    buttons: Vec<Button>,
    custom: Map<String, Value>,
}

/// Relays messages and keeps the history
#[derive(Clone)]
pub struct ChatService {
    dialogue: Arc<dyn DialogueClient>,
    store: ConversationStore,
    downloads: DownloadDir,
}

impl ChatService {
    /// Create the relay
    pub fn new(dialogue: Arc<dyn DialogueClient>, store: ConversationStore, downloads: DownloadDir) -> Self {
        Self {
            dialogue,
            store,
            downloads,
        }
    }

    /// Conversation history
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Download artifacts
    pub fn downloads(&self) -> &DownloadDir {
        &self.downloads
    }

    /// Dialogue manager client
    pub fn dialogue(&self) -> &Arc<dyn DialogueClient> {
        &self.dialogue
    }

    /// Relay one user message; a missing conversation id starts a new conversation
    pub async fn process_message(
        &self,
        message: &str,
        user_id: &str,
        conversation_id: Option<String>,
    ) -> ChatReply {
        let conversation_id = conversation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let span = info_span!("relay", conversation_id = %conversation_id, user_id = %user_id);

        async {
            let replies = match self.dialogue.send(&conversation_id, message).await {
                Ok(replies) => replies,
                Err(e) => {
                    warn!(error = %e, "Dialogue manager request failed");
                    vec![BotMessage::text(UNAVAILABLE_REPLY)]
                }
            };

            let folded = self.fold(replies).await;
            let response = if folded.texts.is_empty() {
                FALLBACK_REPLY.to_string()
            } else {
                folded.texts.join(" ")
            };

            let timestamp = Utc::now();
            self.store
                .append(
                    &conversation_id,
                    [
                        HistoryEntry::User {
                            content: message.to_string(),
                            timestamp,
                            user_id: user_id.to_string(),
                        },
                        HistoryEntry::Assistant {
                            content: response.clone(),
                            buttons: folded.buttons.clone(),
                            custom: folded.custom.clone(),
                            timestamp,
                        },
                    ],
                )
                .await;

            ChatReply {
                response,
                buttons: folded.buttons,
                custom: folded.custom,
                conversation_id: conversation_id.clone(),
                timestamp,
            }
        }
        .instrument(span)
        .await
    }

    /// History of one conversation
    pub async fn history(&self, conversation_id: &str) -> ServerResult<Vec<HistoryEntry>> {
        self.store
            .get(conversation_id)
            .await
            .ok_or_else(|| ServerError::NotFound(format!("Conversation {}", conversation_id)))
    }

    async fn fold(&self, replies: Vec<BotMessage>) -> Folded {
        let mut folded = Folded::default();

        for reply in replies {
            if let Some(text) = reply.text {
                folded.texts.push(text);
            }
            folded.buttons.extend(reply.buttons);

            if let Some(Value::Object(custom)) = reply.custom {
                if custom.get("form_type").and_then(Value::as_str) == Some("download") {
                    self.persist_download(&custom).await;
                    folded.texts.push(DOWNLOAD_TEXT.to_string());
                }
                folded.custom.extend(custom);
            }
        }

        folded
    }

    async fn persist_download(&self, custom: &Map<String, Value>) {
        let Some(file_name) = custom.get("file_name").and_then(Value::as_str) else {
            warn!("Download payload without a file name");
            return;
        };

        let objects = custom
            .get("objects")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        if let Err(e) = self.downloads.write_json(file_name, &objects).await {
            error!(file_name = %file_name, error = %e, "Failed to write download artifact");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::MockDialogueClient;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn service(dialogue: MockDialogueClient, dir: &std::path::Path) -> ChatService {
        ChatService::new(Arc::new(dialogue), ConversationStore::new(), DownloadDir::new(dir))
    }

    fn replies(value: Value) -> Vec<BotMessage> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_replies_are_folded_into_one_message() {
        let dir = tempfile::tempdir().unwrap();
        let mut dialogue = MockDialogueClient::new();
        dialogue
            .expect_send()
            .times(1)
            .returning(|sender, message| {
                assert_eq!((sender, message), ("conv-1", "hello"));
                Ok(replies(json!([
                    {"text": "Hi there!"},
                    {"text": "What do you need?", "buttons": [{"title": "Create", "payload": "/create"}]},
                    {"custom": {"form_type": "multiselect", "objects": {"tables": ["users"]}}}
                ])))
            });

        let chat = service(dialogue, dir.path());
        let reply = chat.process_message("hello", "alice", Some("conv-1".to_string())).await;

        assert_eq!(reply.response, "Hi there! What do you need?");
        assert_eq!(reply.buttons, vec![Button::new("Create", "/create")]);
        assert_eq!(reply.custom["form_type"], "multiselect");
        assert_eq!(reply.conversation_id, "conv-1");

        let history = chat.history("conv-1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].timestamp(), history[1].timestamp());
        match &history[0] {
            HistoryEntry::User { content, user_id, .. } => {
                assert_eq!(content, "hello");
                assert_eq!(user_id, "alice");
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_download_payload_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut dialogue = MockDialogueClient::new();
        dialogue.expect_send().returning(|_, _| {
            Ok(replies(json!([
                {"custom": {
                    "text": "Please download the definitions from the link below",
                    "form_type": "download",
                    "file_name": "object_definitions_1.json",
                    "objects": {"tables": [{"name": "users", "columns": []}]}
                }}
            ])))
        });

        let chat = service(dialogue, dir.path());
        let reply = chat.process_message("go", "anonymous", None).await;

        assert_eq!(reply.response, "Download file");
        assert!(!reply.conversation_id.is_empty());
        let written = std::fs::read_to_string(dir.path().join("object_definitions_1.json")).unwrap();
        let written: Value = serde_json::from_str(&written).unwrap();
        assert_eq!(written, json!({"tables": [{"name": "users", "columns": []}]}));
    }

    #[tokio::test]
    async fn test_unreachable_dialogue_manager_degrades_to_apology() {
        let dir = tempfile::tempdir().unwrap();
        let mut dialogue = MockDialogueClient::new();
        dialogue
            .expect_send()
            .returning(|_, _| Err(ServerError::DialogueError("connection refused".to_string())));

        let chat = service(dialogue, dir.path());
        let reply = chat.process_message("hello", "anonymous", None).await;

        assert_eq!(reply.response, UNAVAILABLE_REPLY);
        assert!(reply.buttons.is_empty());
    }

    #[tokio::test]
    async fn test_silent_dialogue_manager_gets_fallback_text() {
        let dir = tempfile::tempdir().unwrap();
        let mut dialogue = MockDialogueClient::new();
        dialogue.expect_send().returning(|_, _| Ok(Vec::new()));

        let chat = service(dialogue, dir.path());
        let reply = chat.process_message("hello", "anonymous", Some("c".to_string())).await;

        assert_eq!(reply.response, FALLBACK_REPLY);
        assert!(chat.history("missing").await.is_err());
    }
}
