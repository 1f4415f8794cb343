use thiserror::Error;

/// Core error type for the EDDI domain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Input failed validation at a form boundary
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A slot held a value of a shape the reader cannot use
    #[error("Slot '{name}' has an unexpected value: expected {expected}")]
    SlotTypeError {
        /// Slot name
        name: String,
        /// Human readable description of the accepted shape
        expected: &'static str,
    },

    /// Could not open a catalog connection
    #[error("Catalog connection error: {0}")]
    CatalogConnectionError(String),

    /// A catalog query failed
    #[error("Catalog query error: {0}")]
    CatalogQueryError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Named entity not found
    #[error("{0} not found")]
    NotFound(String),

    /// Unexpected internal fault
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl CoreError {
    /// Whether the error came from the catalog collaborator
    pub fn is_catalog_error(&self) -> bool {
        matches!(
            self,
            CoreError::CatalogConnectionError(_) | CoreError::CatalogQueryError(_)
        )
    }
}
