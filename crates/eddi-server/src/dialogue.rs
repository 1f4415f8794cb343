//! Dialogue manager client
//!
//! The relay forwards every user message to the dialogue manager's REST
//! channel and receives the bot replies for that turn.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use eddi_core::BotMessage;

use crate::error::{ServerError, ServerResult};

/// Interface to the dialogue manager
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DialogueClient: Send + Sync {
    /// Send one user message and collect the replies for that turn
    async fn send(&self, sender: &str, message: &str) -> ServerResult<Vec<BotMessage>>;

    /// Whether the dialogue manager answers at all
    async fn is_reachable(&self) -> bool;
}

#[derive(Serialize)]
struct RestMessage<'a> {
    sender: &'a str,
    message: &'a str,
}

/// REST channel client
#[derive(Debug, Clone)]
pub struct HttpDialogueClient {
    client: Client,
    base_url: String,
}

impl HttpDialogueClient {
    /// Create a client for the dialogue manager at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ServerResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServerError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn webhook_url(&self) -> String {
        format!("{}/webhooks/rest/webhook", self.base_url)
    }
}

#[async_trait]
impl DialogueClient for HttpDialogueClient {
    async fn send(&self, sender: &str, message: &str) -> ServerResult<Vec<BotMessage>> {
        let response = self
            .client
            .post(self.webhook_url())
            .json(&RestMessage { sender, message })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServerError::DialogueError(format!(
                "Dialogue manager returned {}",
                response.status()
            )));
        }

        let replies: Vec<BotMessage> = response.json().await?;
        debug!(sender = %sender, replies = replies.len(), "Dialogue manager replied");
        Ok(replies)
    }

    async fn is_reachable(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Dialogue manager unreachable");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddi_core::Button;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpDialogueClient {
        HttpDialogueClient::new(format!("{}/", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_to_rest_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhooks/rest/webhook"))
            .and(body_json(serde_json::json!({"sender": "c-1", "message": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"text": "Hello!", "buttons": [{"title": "Go", "payload": "/go"}]},
                {"custom": {"form_type": "multiselect"}}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let replies = client_for(&server).send("c-1", "hi").await.unwrap();

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].text.as_deref(), Some("Hello!"));
        assert_eq!(replies[0].buttons, vec![Button::new("Go", "/go")]);
        assert!(replies[1].custom.is_some());
    }

    #[tokio::test]
    async fn test_server_error_is_dialogue_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server).send("c-1", "hi").await.unwrap_err();
        assert!(err.is_dialogue_error());
    }

    #[tokio::test]
    async fn test_reachability() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Hello from the dialogue manager"))
            .mount(&server)
            .await;

        assert!(client_for(&server).is_reachable().await);

        let gone = HttpDialogueClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        assert!(!gone.is_reachable().await);
    }
}
