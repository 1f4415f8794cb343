//! Schema descriptor and object definition shapes

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::catalog::{ColumnInfo, ObjectCategory, RoutineInfo, SchemaInfo, SequenceInfo};
use crate::{CoreError, CoreResult};

/// Source text used when a definition cannot be looked up
pub const DEFINITION_NOT_AVAILABLE: &str = "-- Definition not available";

/// Fixed reviewer hint at the top of every descriptor
pub const DESCRIPTOR_COMMENT: &str = "Review the object lists and keep only the required objects";

lazy_static! {
    static ref HOST_ENDPOINT: Regex = Regex::new(r"@([^/]+)/").expect("valid regex");
}

/// Host portion of a connection string, or `"unknown"`
pub fn host_endpoint(connection_string: &str) -> String {
    HOST_ENDPOINT
        .captures(connection_string)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Object selection, category to names
pub type ObjectSelection = BTreeMap<ObjectCategory, Vec<String>>;

/// Result of a describe pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Reviewer hint
    pub comments: String,
    /// Host (and port) the catalog was read from
    pub database_host_endpoint: String,
    /// Object names per requested category
    pub objects: BTreeMap<ObjectCategory, Vec<String>>,
    /// Categories that failed, with their error message
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<ObjectCategory, String>,
}

impl SchemaDescriptor {
    /// Empty descriptor for a host
    pub fn new(database_host_endpoint: impl Into<String>) -> Self {
        Self {
            comments: DESCRIPTOR_COMMENT.to_string(),
            database_host_endpoint: database_host_endpoint.into(),
            objects: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    /// Pretty printed JSON
    pub fn to_pretty_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read a user selection.
///
/// Accepts `{"objects": {category: [names]}}`. A missing `objects` key reads
/// as an empty selection. Unknown categories and non-string names are
/// skipped; categories with no names are dropped.
pub fn parse_selection(value: &Value) -> CoreResult<ObjectSelection> {
    if !value.is_object() {
        return Err(CoreError::ValidationError(
            "selection must be a JSON object".to_string(),
        ));
    }
    let objects = match value.get("objects") {
        Some(Value::Object(map)) => map,
        None | Some(Value::Null) => return Ok(ObjectSelection::new()),
        _ => {
            return Err(CoreError::ValidationError(
                "'objects' must map object types to name lists".to_string(),
            ))
        }
    };

    let mut selection = ObjectSelection::new();
    for (key, names) in objects {
        let category = match key.parse::<ObjectCategory>() {
            Ok(category) => category,
            Err(_) => continue,
        };
        let names: Vec<String> = match names {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(String::from))
                .collect(),
            Value::String(name) => vec![name.clone()],
            _ => Vec::new(),
        };
        if !names.is_empty() {
            selection.entry(category).or_default().extend(names);
        }
    }
    Ok(selection)
}

/// One column of a table or view definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Data type with a `(len)` suffix for length limited types
    #[serde(rename = "type")]
    pub data_type: String,
    /// Whether the column accepts nulls
    pub nullable: bool,
}

impl From<ColumnInfo> for ColumnDefinition {
    fn from(column: ColumnInfo) -> Self {
        let data_type = match column.character_maximum_length {
            Some(len) if len != 0 => format!("{}({})", column.data_type, len),
            _ => column.data_type,
        };
        Self {
            name: column.name,
            data_type,
            nullable: column.is_nullable.eq_ignore_ascii_case("yes"),
        }
    }
}

/// Category-specific detail record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefinitionRecord {
    /// Tables and views
    Relation {
        /// Relation name
        name: String,
        /// Ordered columns
        columns: Vec<ColumnDefinition>,
    },
    /// Functions and procedures
    Routine {
        /// Routine name
        name: String,
        /// Argument list
        arguments: String,
        /// Return type
        return_type: String,
        /// Source text
        source: String,
    },
    /// Indexes, constraints, triggers, materialized views
    Definition {
        /// Object name
        name: String,
        /// Reconstructed DDL
        definition: String,
    },
    /// Schemas
    Schema {
        /// Schema name
        name: String,
        /// Owning role
        owner: String,
    },
    /// Lookup failed or returned nothing
    Unavailable {
        /// Object name
        name: String,
        /// Always [`DEFINITION_NOT_AVAILABLE`]
        source: String,
    },
    /// Sequences. Must stay the last variant: with both fields optional it
    /// matches any record carrying a name.
    Sequence {
        /// Sequence name
        name: String,
        /// Serial sequence name
        sequence_name: Option<String>,
        /// Owning column
        column_name: Option<String>,
    },
}

impl DefinitionRecord {
    /// Fallback record for a missing object
    pub fn unavailable(name: impl Into<String>) -> Self {
        DefinitionRecord::Unavailable {
            name: name.into(),
            source: DEFINITION_NOT_AVAILABLE.to_string(),
        }
    }

    /// Whether this is the fallback record
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DefinitionRecord::Unavailable { .. })
    }

    /// Object name
    pub fn name(&self) -> &str {
        match self {
            DefinitionRecord::Relation { name, .. }
            | DefinitionRecord::Routine { name, .. }
            | DefinitionRecord::Sequence { name, .. }
            | DefinitionRecord::Definition { name, .. }
            | DefinitionRecord::Schema { name, .. }
            | DefinitionRecord::Unavailable { name, .. } => name,
        }
    }
}

impl From<RoutineInfo> for DefinitionRecord {
    fn from(routine: RoutineInfo) -> Self {
        DefinitionRecord::Routine {
            name: routine.name,
            arguments: routine.arguments,
            return_type: routine.return_type,
            source: routine.source,
        }
    }
}

impl From<SequenceInfo> for DefinitionRecord {
    fn from(sequence: SequenceInfo) -> Self {
        DefinitionRecord::Sequence {
            name: sequence.name,
            sequence_name: sequence.sequence_name,
            column_name: sequence.column_name,
        }
    }
}

impl From<SchemaInfo> for DefinitionRecord {
    fn from(schema: SchemaInfo) -> Self {
        DefinitionRecord::Schema {
            name: schema.name,
            owner: schema.owner,
        }
    }
}

/// Expanded definitions for a selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDefinitions {
    /// Host the catalog was read from
    pub database_host_endpoint: String,
    /// Detail records per category
    pub definitions: BTreeMap<ObjectCategory, Vec<DefinitionRecord>>,
}

impl ObjectDefinitions {
    /// Empty definitions for a host
    pub fn new(database_host_endpoint: impl Into<String>) -> Self {
        Self {
            database_host_endpoint: database_host_endpoint.into(),
            definitions: BTreeMap::new(),
        }
    }
}
