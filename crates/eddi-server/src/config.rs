//! Configuration for the EDDI server
//!
//! Values are layered: built-in defaults, then an optional `eddi.toml` (or the
//! file named by `EDDI_CONFIG`), then `EDDI_*` environment variables.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::warn;

use eddi_actions::ActionSettings;
use eddi_catalog_postgres::PostgresCatalogConfig;
use eddi_core::DecisionTable;

use crate::error::{ServerError, ServerResult};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// Base URL of the dialogue manager
    #[serde(default = "default_dialogue_url")]
    pub dialogue_url: String,

    /// Directory download artifacts are written to and served from
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Decision table used for recommendations
    #[serde(default)]
    pub decision_table: DecisionTable,

    /// Timeout for one dialogue manager round trip
    #[serde(default = "default_dialogue_timeout")]
    pub dialogue_timeout_secs: u64,

    /// Timeout for opening a catalog connection
    #[serde(default = "default_catalog_connect_timeout")]
    pub catalog_connect_timeout_secs: u64,

    /// `statement_timeout` applied to catalog sessions
    #[serde(default = "default_statement_timeout")]
    pub catalog_statement_timeout_ms: u64,
}

fn default_port() -> u16 {
    9000
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_dialogue_url() -> String {
    "http://localhost:45005".to_string()
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("/tmp/downloads")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dialogue_timeout() -> u64 {
    30
}

fn default_catalog_connect_timeout() -> u64 {
    10
}

fn default_statement_timeout() -> u64 {
    30_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            dialogue_url: default_dialogue_url(),
            download_dir: default_download_dir(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            decision_table: DecisionTable::default(),
            dialogue_timeout_secs: default_dialogue_timeout(),
            catalog_connect_timeout_secs: default_catalog_connect_timeout(),
            catalog_statement_timeout_ms: default_statement_timeout(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from defaults, an optional config file and the environment
    pub fn load() -> ServerResult<Self> {
        let file = env::var("EDDI_CONFIG").unwrap_or_else(|_| "eddi".to_string());
        Self::load_from(&file, Environment::with_prefix("EDDI").try_parsing(true))
    }

    fn load_from(file: &str, environment: Environment) -> ServerResult<Self> {
        let config: ServerConfig = Config::builder()
            .add_source(Config::try_from(&ServerConfig::default())?)
            .add_source(File::with_name(file).required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> ServerResult<()> {
        if self.dialogue_url.trim().is_empty() {
            return Err(ServerError::ConfigError("dialogue_url must not be empty".to_string()));
        }

        if self.download_dir.as_os_str().is_empty() {
            return Err(ServerError::ConfigError("download_dir must not be empty".to_string()));
        }

        if self.dialogue_timeout_secs == 0
            || self.catalog_connect_timeout_secs == 0
            || self.catalog_statement_timeout_ms == 0
        {
            return Err(ServerError::ConfigError("timeouts must be greater than zero".to_string()));
        }

        if self.bind_address == "0.0.0.0" {
            warn!("Listening on all interfaces");
        }

        if self.download_dir.starts_with("/tmp") {
            warn!(dir = %self.download_dir.display(), "Download artifacts are kept in a temporary directory");
        }

        Ok(())
    }

    /// Settings for catalog sessions
    pub fn catalog_config(&self) -> PostgresCatalogConfig {
        PostgresCatalogConfig {
            connect_timeout_secs: self.catalog_connect_timeout_secs,
            statement_timeout_ms: self.catalog_statement_timeout_ms,
        }
    }

    /// Settings for the standard actions
    pub fn action_settings(&self) -> ActionSettings {
        ActionSettings {
            decision_table: self.decision_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_source(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("EDDI").try_parsing(true).source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::load_from("does-not-exist", env_source(&[])).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.dialogue_url, "http://localhost:45005");
        assert_eq!(config.download_dir, PathBuf::from("/tmp/downloads"));
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.decision_table, DecisionTable::Flat);
        assert_eq!(config.dialogue_timeout_secs, 30);
        assert_eq!(config.catalog_config(), PostgresCatalogConfig::default());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "port = 9100\ndialogue_url = \"http://from-file:5005\"").unwrap();
        let path = file.path().with_extension("");
        let stem = path.to_str().unwrap();

        let config = ServerConfig::load_from(
            stem,
            env_source(&[
                ("EDDI_DIALOGUE_URL", "http://from-env:5005"),
                ("EDDI_DECISION_TABLE", "tree"),
                ("EDDI_LOG_FORMAT", "json"),
            ]),
        )
        .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.dialogue_url, "http://from-env:5005");
        assert_eq!(config.decision_table, DecisionTable::Tree);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.action_settings().decision_table, DecisionTable::Tree);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = ServerConfig {
            dialogue_timeout_secs: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ServerError::ConfigError(_))));
    }

    #[test]
    fn test_empty_dialogue_url_is_rejected() {
        let config = ServerConfig {
            dialogue_url: " ".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
