//! Catalog collaborator traits
//!
//! The descriptor builder never talks to a database directly. It asks a
//! [`CatalogProvider`] for a [`CatalogSession`] scoped to one connection
//! string, runs its lookups, then closes the session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

/// Catalog object category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    /// Base tables
    Tables,
    /// Views
    Views,
    /// Functions
    Functions,
    /// Sequences
    Sequences,
    /// Indexes
    Indexes,
    /// Table constraints
    Constraints,
    /// Triggers
    Triggers,
    /// Materialized views
    MaterializedViews,
    /// Stored procedures
    Procedures,
    /// Schemas (namespaces)
    Schemas,
}

impl ObjectCategory {
    /// Every supported category
    pub const ALL: [ObjectCategory; 10] = [
        ObjectCategory::Tables,
        ObjectCategory::Views,
        ObjectCategory::Functions,
        ObjectCategory::Sequences,
        ObjectCategory::Indexes,
        ObjectCategory::Constraints,
        ObjectCategory::Triggers,
        ObjectCategory::MaterializedViews,
        ObjectCategory::Procedures,
        ObjectCategory::Schemas,
    ];

    /// Wire name, e.g. `materialized_views`
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectCategory::Tables => "tables",
            ObjectCategory::Views => "views",
            ObjectCategory::Functions => "functions",
            ObjectCategory::Sequences => "sequences",
            ObjectCategory::Indexes => "indexes",
            ObjectCategory::Constraints => "constraints",
            ObjectCategory::Triggers => "triggers",
            ObjectCategory::MaterializedViews => "materialized_views",
            ObjectCategory::Procedures => "procedures",
            ObjectCategory::Schemas => "schemas",
        }
    }

    /// Categories whose details are column lists
    pub fn is_relation(&self) -> bool {
        matches!(self, ObjectCategory::Tables | ObjectCategory::Views)
    }

    /// Categories whose details come from the routine catalog
    pub fn is_routine(&self) -> bool {
        matches!(self, ObjectCategory::Functions | ObjectCategory::Procedures)
    }
}

impl FromStr for ObjectCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ObjectCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| CoreError::ValidationError(format!("Unsupported object type '{}'", s.trim())))
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the column catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Declared data type
    pub data_type: String,
    /// Length limit for character types
    pub character_maximum_length: Option<i32>,
    /// Raw `is_nullable` value (`YES` / `NO`)
    pub is_nullable: String,
}

/// Function or procedure signature and body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineInfo {
    /// Routine name
    pub name: String,
    /// Rendered argument list
    pub arguments: String,
    /// Rendered return type
    pub return_type: String,
    /// Source text
    pub source: String,
}

/// Sequence and the column that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceInfo {
    /// Sequence name
    pub name: String,
    /// Fully qualified serial sequence name, if any
    pub sequence_name: Option<String>,
    /// Owning column
    pub column_name: Option<String>,
}

/// Reconstructed DDL for an index, constraint, trigger or materialized view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDefinitionInfo {
    /// Object name
    pub name: String,
    /// Definition text
    pub definition: String,
}

/// Schema and its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaInfo {
    /// Schema name
    pub name: String,
    /// Owning role
    pub owner: String,
}

/// Execution plan for a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplainOutput {
    /// `EXPLAIN (FORMAT JSON)` output
    pub json_plan: Value,
    /// Plain text plan
    pub text_plan: String,
    /// Whether the plan came from `ANALYZE` (the query was executed)
    pub analyzed: bool,
}

/// An open catalog connection
#[async_trait]
pub trait CatalogSession: Send {
    /// Names in one category, in the catalog's natural order
    async fn object_names(&mut self, category: ObjectCategory) -> CoreResult<Vec<String>>;

    /// Columns of a table or view, ordered by position
    async fn columns(&mut self, relation: &str) -> CoreResult<Vec<ColumnInfo>>;

    /// Function or procedure details
    async fn routine(&mut self, category: ObjectCategory, name: &str) -> CoreResult<Option<RoutineInfo>>;

    /// Sequence details
    async fn sequence(&mut self, name: &str) -> CoreResult<Option<SequenceInfo>>;

    /// Reconstructed definition for indexes, constraints, triggers and
    /// materialized views
    async fn definition(
        &mut self,
        category: ObjectCategory,
        name: &str,
    ) -> CoreResult<Option<ObjectDefinitionInfo>>;

    /// Schema owner
    async fn schema(&mut self, name: &str) -> CoreResult<Option<SchemaInfo>>;

    /// Execution plan for a query. Must not leave side effects behind.
    async fn explain(&mut self, sql: &str) -> CoreResult<ExplainOutput>;

    /// Release the connection
    async fn close(self: Box<Self>) -> CoreResult<()>;
}

/// Opens catalog sessions from connection strings
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Open a session
    async fn open(&self, connection_string: &str) -> CoreResult<Box<dyn CatalogSession>>;

    /// Check that a connection can be established
    async fn probe(&self, connection_string: &str) -> CoreResult<()> {
        let session = self.open(connection_string).await?;
        session.close().await
    }
}
