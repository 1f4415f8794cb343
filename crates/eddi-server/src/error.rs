//! Error types for the EDDI server

use eddi_core::CoreError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The dialogue manager could not be reached or answered badly
    #[error("Dialogue manager error: {0}")]
    DialogueError(String),

    /// Catalog access failed
    #[error("Catalog error: {0}")]
    CatalogError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(what) => ServerError::NotFound(what),
            CoreError::ValidationError(msg) => ServerError::ValidationError(msg),
            err @ CoreError::SlotTypeError { .. } => ServerError::ValidationError(err.to_string()),
            err if err.is_catalog_error() => ServerError::CatalogError(err.to_string()),
            other => ServerError::InternalError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::ValidationError(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(err: reqwest::Error) -> Self {
        ServerError::DialogueError(format!("HTTP request error: {}", err))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ServerError::NotFound("File".to_string()),
            _ => ServerError::InternalError(format!("IO error: {}", err)),
        }
    }
}

impl From<config::ConfigError> for ServerError {
    fn from(err: config::ConfigError) -> Self {
        ServerError::ConfigError(err.to_string())
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(format!("Error: {}", err))
    }
}

impl ServerError {
    /// Whether the error came from the dialogue manager
    pub fn is_dialogue_error(&self) -> bool {
        matches!(self, ServerError::DialogueError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_map_to_server_errors() {
        assert!(matches!(
            ServerError::from(CoreError::NotFound("Conversation x".into())),
            ServerError::NotFound(_)
        ));
        assert!(matches!(
            ServerError::from(CoreError::CatalogQueryError("boom".into())),
            ServerError::CatalogError(_)
        ));
        assert!(matches!(
            ServerError::from(CoreError::SlotTypeError { name: "a".into(), expected: "text" }),
            ServerError::ValidationError(_)
        ));
        assert!(matches!(
            ServerError::from(CoreError::InternalError("x".into())),
            ServerError::InternalError(_)
        ));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(ServerError::from(err).to_string(), "File not found");
    }
}
