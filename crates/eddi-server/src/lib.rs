//!
//! EDDI Server - message relay and action server for the EDDI database assistant
//!
//! One process serves the chat relay used by the web client, the download
//! endpoint for generated artifacts, and the webhook the dialogue manager
//! calls to run actions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// API module
pub mod api;

/// Message relay
pub mod chat_service;

/// Configuration module
pub mod config;

/// Conversation history
pub mod conversation_store;

/// Dialogue manager client
pub mod dialogue;

/// Download artifacts
pub mod downloads;

/// Error module
pub mod error;

use eddi_actions::ActionRegistry;
use eddi_catalog_postgres::PostgresCatalogProvider;
use eddi_core::{CatalogProvider, RandomTicketIds, SchemaExplorer};

use crate::api::ws::WsConnections;
use crate::chat_service::ChatService;
use crate::config::LogFormat;
use crate::conversation_store::ConversationStore;
use crate::dialogue::{DialogueClient, HttpDialogueClient};
use crate::downloads::DownloadDir;

// Re-export key types
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Message relay
    pub chat: ChatService,
    /// Registered dialogue actions
    pub actions: Arc<ActionRegistry>,
    /// Connected WebSocket clients
    pub connections: WsConnections,
}

impl AppState {
    /// Assemble state from explicit collaborators
    pub fn new(
        dialogue: Arc<dyn DialogueClient>,
        downloads: DownloadDir,
        actions: ActionRegistry,
    ) -> Self {
        Self {
            chat: ChatService::new(dialogue, ConversationStore::new(), downloads),
            actions: Arc::new(actions),
            connections: WsConnections::new(),
        }
    }

    /// Assemble production state from configuration
    pub fn from_config(config: &ServerConfig) -> ServerResult<Self> {
        let dialogue = HttpDialogueClient::new(
            config.dialogue_url.clone(),
            Duration::from_secs(config.dialogue_timeout_secs),
        )?;

        let catalog: Arc<dyn CatalogProvider> =
            Arc::new(PostgresCatalogProvider::new(config.catalog_config()));
        let actions = ActionRegistry::standard(
            config.action_settings(),
            SchemaExplorer::new(catalog),
            Arc::new(RandomTicketIds),
        );

        Ok(Self::new(
            Arc::new(dialogue),
            DownloadDir::new(config.download_dir.clone()),
            actions,
        ))
    }
}

/// Initialize logging; `RUST_LOG` wins over the configured level
pub fn init_logging(config: &ServerConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    let installed = match config.log_format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

/// Serve the API on an already bound listener until shutdown is signalled
pub async fn serve(listener: TcpListener, state: AppState) -> ServerResult<()> {
    let app = api::build_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    let state = AppState::from_config(&config)?;
    state.chat.downloads().ensure().await?;

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| ServerError::ConfigError(format!("Invalid bind address: {}", e)))?;
    let listener = TcpListener::bind(addr).await?;

    info!(
        address = %addr,
        dialogue_url = %config.dialogue_url,
        decision_table = ?config.decision_table,
        download_dir = %config.download_dir.display(),
        "EDDI server listening"
    );

    serve(listener, state).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
