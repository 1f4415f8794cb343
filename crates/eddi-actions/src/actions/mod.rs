// Action implementations, grouped by conversation flow

pub mod database_requests;
pub mod query_analyzer;
pub mod recommendation;
pub mod restart;
pub mod schema_explorer;

pub use database_requests::*;
pub use query_analyzer::*;
pub use recommendation::*;
pub use restart::*;
pub use schema_explorer::*;

use eddi_core::{ActionName, ActionResponse, CoreError};

/// Generic apology for unexpected faults
pub const APOLOGY: &str = "Sorry, an error occurred while processing your request.";

/// Log an unexpected fault and answer with the apology, without events
pub(crate) fn internal_fault(action: ActionName, err: &CoreError) -> ActionResponse {
    tracing::error!(action = %action, error = %err, "Action failed");
    ActionResponse::message(APOLOGY)
}

/// Prefix used by the download endpoint for generated artifacts
pub(crate) fn download_url(file_name: &str) -> String {
    format!("/download/{}", file_name)
}
