//! PostgreSQL catalog provider for EDDI
//!
//! Every session owns one short-lived connection opened from the connection
//! string the user supplied in the dialogue. Sessions are never pooled since
//! each conversation may point at a different database.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use eddi_core::{host_endpoint, CatalogProvider, CatalogSession, CoreError, CoreResult};

mod queries;
mod session;

pub use session::PostgresCatalogSession;

/// Connection settings applied to every catalog session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresCatalogConfig {
    /// Seconds to wait for the connection handshake
    pub connect_timeout_secs: u64,

    /// `statement_timeout` set on the session, in milliseconds
    pub statement_timeout_ms: u64,
}

impl Default for PostgresCatalogConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            statement_timeout_ms: 30_000,
        }
    }
}

/// Opens a fresh connection per session
#[derive(Debug, Clone, Default)]
pub struct PostgresCatalogProvider {
    config: PostgresCatalogConfig,
}

impl PostgresCatalogProvider {
    /// Create a provider
    pub fn new(config: PostgresCatalogConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    pub fn config(&self) -> &PostgresCatalogConfig {
        &self.config
    }

    fn connect_options(&self, connection_string: &str) -> CoreResult<PgConnectOptions> {
        let options = PgConnectOptions::from_str(connection_string)
            .map_err(|e| CoreError::CatalogConnectionError(format!("Invalid connection string: {}", e)))?
            .options([("statement_timeout", self.config.statement_timeout_ms.to_string())])
            .application_name("eddi")
            .disable_statement_logging();
        Ok(options)
    }
}

#[async_trait]
impl CatalogProvider for PostgresCatalogProvider {
    async fn open(&self, connection_string: &str) -> CoreResult<Box<dyn CatalogSession>> {
        let options = self.connect_options(connection_string)?;
        let host = host_endpoint(connection_string);
        let timeout = Duration::from_secs(self.config.connect_timeout_secs);

        let conn = match tokio::time::timeout(timeout, PgConnection::connect_with(&options)).await {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                return Err(CoreError::CatalogConnectionError(format!(
                    "Failed to connect to {}: {}",
                    host, e
                )))
            }
            Err(_) => {
                return Err(CoreError::CatalogConnectionError(format!(
                    "Timed out connecting to {} after {}s",
                    host, self.config.connect_timeout_secs
                )))
            }
        };

        debug!(host = %host, "Opened catalog session");
        Ok(Box::new(PostgresCatalogSession::new(conn)))
    }
}
