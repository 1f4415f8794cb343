//!
//! EDDI Core - domain model and decision logic for the EDDI database assistant
//!
//! This crate holds everything the dialogue actions decide on: the slot sets
//! collected by the dialogue manager, the database recommendation engine and
//! its cost model, the catalog collaborator traits and the schema descriptor
//! builder. It performs no I/O of its own; catalog access goes through the
//! [`CatalogProvider`] seam.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - slot sets, recommendation rules, catalog shapes, validation
pub mod domain;

/// Application services - action contract and schema exploration
pub mod application;

/// Error types
pub mod error;

/// In-memory fakes for tests
#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

// Re-export key types
pub use error::{CoreError, CoreResult};

pub use domain::catalog::{
    CatalogProvider, CatalogSession, ColumnInfo, ExplainOutput, ObjectCategory,
    ObjectDefinitionInfo, RoutineInfo, SchemaInfo, SequenceInfo,
};
pub use domain::dialogue::{ActionResponse, BotMessage, Button, Event, LatestMessage, Tracker};
pub use domain::recommendation::{
    recommend_flat, recommend_tree, DecisionTable, DeploymentQualifier, Recommendation,
};
pub use domain::schema::{
    host_endpoint, DefinitionRecord, ObjectDefinitions, ObjectSelection, SchemaDescriptor,
};
pub use domain::slots::{FlatSlots, TreeSlots};
pub use domain::ticket::{RandomTicketIds, TicketId, TicketIdGenerator};

pub use application::action::{Action, ActionName};
pub use application::schema_explorer::{describe_schema, expand_definitions, SchemaExplorer};
