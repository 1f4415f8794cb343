//! In-memory conversation history
//!
//! History lives for the lifetime of the process; nothing is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use eddi_core::Button;

const TITLE_LIMIT: usize = 30;
const DEFAULT_TITLE: &str = "New Conversation";

/// One turn of a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum HistoryEntry {
    /// Message typed by the user
    User {
        /// Message text
        content: String,
        /// When the turn was relayed
        timestamp: DateTime<Utc>,
        /// Who sent it
        user_id: String,
    },

    /// Aggregated bot reply
    Assistant {
        /// Joined reply text
        content: String,
        /// Quick-reply buttons
        buttons: Vec<Button>,
        /// Merged structured payloads
        custom: Map<String, Value>,
        /// When the turn was relayed
        timestamp: DateTime<Utc>,
    },
}

impl HistoryEntry {
    /// When the entry was recorded
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            HistoryEntry::User { timestamp, .. } | HistoryEntry::Assistant { timestamp, .. } => {
                *timestamp
            }
        }
    }
}

/// Row of the conversation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation id
    pub id: String,
    /// First user message, shortened
    pub title: String,
    /// Timestamp of the latest entry
    pub updated_at: DateTime<Utc>,
}

/// Conversation id to ordered history
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    conversations: Arc<RwLock<HashMap<String, Vec<HistoryEntry>>>>,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append entries to a conversation, creating it on first use
    pub async fn append(&self, conversation_id: &str, entries: impl IntoIterator<Item = HistoryEntry>) {
        let mut conversations = self.conversations.write().await;
        conversations
            .entry(conversation_id.to_string())
            .or_default()
            .extend(entries);
    }

    /// History of one conversation
    pub async fn get(&self, conversation_id: &str) -> Option<Vec<HistoryEntry>> {
        let conversations = self.conversations.read().await;
        conversations.get(conversation_id).cloned()
    }

    /// Conversations with at least one entry, most recently updated first
    pub async fn summaries(&self) -> Vec<ConversationSummary> {
        let conversations = self.conversations.read().await;
        let mut summaries: Vec<ConversationSummary> = conversations
            .iter()
            .filter_map(|(id, entries)| {
                let last = entries.last()?;
                Some(ConversationSummary {
                    id: id.clone(),
                    title: title_of(entries),
                    updated_at: last.timestamp(),
                })
            })
            .collect();

        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    /// Remove a conversation; false when it did not exist
    pub async fn delete(&self, conversation_id: &str) -> bool {
        let mut conversations = self.conversations.write().await;
        conversations.remove(conversation_id).is_some()
    }
}

fn title_of(entries: &[HistoryEntry]) -> String {
    entries
        .iter()
        .find_map(|entry| match entry {
            HistoryEntry::User { content, .. } => Some(shorten(content)),
            HistoryEntry::Assistant { .. } => None,
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn shorten(content: &str) -> String {
    if content.chars().count() > TITLE_LIMIT {
        let head: String = content.chars().take(TITLE_LIMIT).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn user(content: &str, at: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry::User {
            content: content.to_string(),
            timestamp: at,
            user_id: "anonymous".to_string(),
        }
    }

    fn assistant(content: &str, at: DateTime<Utc>) -> HistoryEntry {
        HistoryEntry::Assistant {
            content: content.to_string(),
            buttons: Vec::new(),
            custom: Map::new(),
            timestamp: at,
        }
    }

    #[test]
    fn test_entry_wire_format() {
        let at = "2024-05-01T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let json = serde_json::to_value(assistant("Hi", at)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "assistant",
                "content": "Hi",
                "buttons": [],
                "custom": {},
                "timestamp": "2024-05-01T10:00:00Z"
            })
        );
        let json = serde_json::to_value(user("Hello", at)).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["user_id"], "anonymous");
    }

    #[test]
    fn test_titles() {
        let now = Utc::now();
        assert_eq!(title_of(&[user("short", now)]), "short");
        assert_eq!(
            title_of(&[assistant("hello", now), user("I need a database for my new billing service", now)]),
            "I need a database for my new b..."
        );
        assert_eq!(title_of(&[assistant("hello", now)]), "New Conversation");
        assert_eq!(title_of(&[user(&"x".repeat(30), now)]), "x".repeat(30));
    }

    #[tokio::test]
    async fn test_summaries_sorted_by_latest_entry() {
        let store = ConversationStore::new();
        let earlier = Utc::now() - Duration::minutes(5);
        let later = Utc::now();

        store.append("a", [user("first", earlier), assistant("ok", earlier)]).await;
        store.append("b", [user("second", later)]).await;
        store.append("empty", Vec::<HistoryEntry>::new()).await;

        let summaries = store.summaries().await;
        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(summaries[1].updated_at, earlier);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = ConversationStore::new();
        store.append("a", [user("first", Utc::now())]).await;

        assert!(store.delete("a").await);
        assert!(!store.delete("a").await);
        assert!(store.get("a").await.is_none());
    }
}
