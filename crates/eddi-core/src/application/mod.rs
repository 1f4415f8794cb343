/// Action contract shared by every dialogue action
pub mod action;

/// Schema descriptor builder over a catalog session
pub mod schema_explorer;
