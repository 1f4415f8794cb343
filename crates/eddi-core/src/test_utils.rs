//! In-memory catalog fake
//!
//! `FakeCatalog` answers every catalog lookup from maps filled in by its
//! builder methods and counts opened and closed sessions, so tests can check
//! that connections are released on every path.

use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::catalog::{
    CatalogProvider, CatalogSession, ColumnInfo, ExplainOutput, ObjectCategory,
    ObjectDefinitionInfo, RoutineInfo, SchemaInfo, SequenceInfo,
};
use crate::{CoreError, CoreResult};

#[derive(Default)]
struct Contents {
    names: HashMap<ObjectCategory, Vec<String>>,
    columns: HashMap<String, Vec<ColumnInfo>>,
    routines: HashMap<(ObjectCategory, String), RoutineInfo>,
    sequences: HashMap<String, SequenceInfo>,
    definitions: HashMap<(ObjectCategory, String), String>,
    schemas: HashMap<String, String>,
    failing_categories: HashSet<ObjectCategory>,
    failing_objects: HashSet<String>,
    refuse_connections: bool,
    analyze_fails: bool,
}

#[derive(Default)]
struct Counters {
    opened: AtomicUsize,
    closed: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

/// Catalog provider backed by in-memory maps
#[derive(Clone, Default)]
pub struct FakeCatalog {
    contents: Arc<Contents>,
    counters: Arc<Counters>,
}

impl fmt::Debug for FakeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeCatalog")
            .field("opened", &self.opened())
            .field("closed", &self.closed())
            .finish()
    }
}

impl FakeCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    fn edit(mut self, f: impl FnOnce(&mut Contents)) -> Self {
        // Builders run before the fake is shared
        if let Some(contents) = Arc::get_mut(&mut self.contents) {
            f(contents);
        }
        self
    }

    /// Object names for a category, in catalog order
    pub fn with_objects(self, category: ObjectCategory, names: &[&str]) -> Self {
        let names = names.iter().map(|n| n.to_string()).collect();
        self.edit(|c| {
            c.names.insert(category, names);
        })
    }

    /// Columns for a table or view, as `(name, type, max length, nullable)`
    pub fn with_columns(self, relation: &str, columns: &[(&str, &str, Option<i32>, bool)]) -> Self {
        let columns = columns
            .iter()
            .map(|(name, data_type, len, nullable)| ColumnInfo {
                name: name.to_string(),
                data_type: data_type.to_string(),
                character_maximum_length: *len,
                is_nullable: if *nullable { "YES" } else { "NO" }.to_string(),
            })
            .collect();
        let relation = relation.to_string();
        self.edit(|c| {
            c.columns.insert(relation, columns);
        })
    }

    /// A function or procedure
    pub fn with_routine(self, category: ObjectCategory, routine: RoutineInfo) -> Self {
        self.edit(|c| {
            c.routines.insert((category, routine.name.clone()), routine);
        })
    }

    /// A sequence
    pub fn with_sequence(self, sequence: SequenceInfo) -> Self {
        self.edit(|c| {
            c.sequences.insert(sequence.name.clone(), sequence);
        })
    }

    /// Definition text for an index, constraint, trigger or materialized view
    pub fn with_definition(self, category: ObjectCategory, name: &str, definition: &str) -> Self {
        let key = (category, name.to_string());
        let definition = definition.to_string();
        self.edit(|c| {
            c.definitions.insert(key, definition);
        })
    }

    /// A schema and its owner
    pub fn with_schema(self, name: &str, owner: &str) -> Self {
        let (name, owner) = (name.to_string(), owner.to_string());
        self.edit(|c| {
            c.schemas.insert(name, owner);
        })
    }

    /// Make listing a category fail
    pub fn failing_category(self, category: ObjectCategory) -> Self {
        self.edit(|c| {
            c.failing_categories.insert(category);
        })
    }

    /// Make every detail lookup for an object name fail
    pub fn failing_object(self, name: &str) -> Self {
        let name = name.to_string();
        self.edit(|c| {
            c.failing_objects.insert(name);
        })
    }

    /// Refuse every connection attempt
    pub fn refusing_connections(self) -> Self {
        self.edit(|c| c.refuse_connections = true)
    }

    /// Make `EXPLAIN ANALYZE` fail so the plain plan is returned
    pub fn without_analyze(self) -> Self {
        self.edit(|c| c.analyze_fails = true)
    }

    /// Sessions opened so far
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Sessions closed so far
    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Every lookup issued, as `"<kind>:<target>"`
    pub fn queries(&self) -> Vec<String> {
        self.counters
            .queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    async fn open(&self, connection_string: &str) -> CoreResult<Box<dyn CatalogSession>> {
        if self.contents.refuse_connections {
            return Err(CoreError::CatalogConnectionError(format!(
                "connection refused for {}",
                crate::host_endpoint(connection_string)
            )));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            contents: Arc::clone(&self.contents),
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct FakeSession {
    contents: Arc<Contents>,
    counters: Arc<Counters>,
}

impl FakeSession {
    fn record(&self, kind: &str, target: &str) -> CoreResult<()> {
        if let Ok(mut queries) = self.counters.queries.lock() {
            queries.push(format!("{}:{}", kind, target));
        }
        if self.contents.failing_objects.contains(target) {
            return Err(CoreError::CatalogQueryError(format!("lookup of {} failed", target)));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogSession for FakeSession {
    async fn object_names(&mut self, category: ObjectCategory) -> CoreResult<Vec<String>> {
        self.record("list", category.as_str())?;
        if self.contents.failing_categories.contains(&category) {
            return Err(CoreError::CatalogQueryError(format!(
                "relation for {} does not exist",
                category
            )));
        }
        Ok(self.contents.names.get(&category).cloned().unwrap_or_default())
    }

    async fn columns(&mut self, relation: &str) -> CoreResult<Vec<ColumnInfo>> {
        self.record("columns", relation)?;
        Ok(self.contents.columns.get(relation).cloned().unwrap_or_default())
    }

    async fn routine(&mut self, category: ObjectCategory, name: &str) -> CoreResult<Option<RoutineInfo>> {
        self.record(category.as_str(), name)?;
        Ok(self.contents.routines.get(&(category, name.to_string())).cloned())
    }

    async fn sequence(&mut self, name: &str) -> CoreResult<Option<SequenceInfo>> {
        self.record("sequences", name)?;
        Ok(self.contents.sequences.get(name).cloned())
    }

    async fn definition(
        &mut self,
        category: ObjectCategory,
        name: &str,
    ) -> CoreResult<Option<ObjectDefinitionInfo>> {
        self.record(category.as_str(), name)?;
        Ok(self
            .contents
            .definitions
            .get(&(category, name.to_string()))
            .map(|definition| ObjectDefinitionInfo {
                name: name.to_string(),
                definition: definition.clone(),
            }))
    }

    async fn schema(&mut self, name: &str) -> CoreResult<Option<SchemaInfo>> {
        self.record("schemas", name)?;
        Ok(self.contents.schemas.get(name).map(|owner| SchemaInfo {
            name: name.to_string(),
            owner: owner.clone(),
        }))
    }

    async fn explain(&mut self, sql: &str) -> CoreResult<ExplainOutput> {
        self.record("explain", sql)?;
        let analyzed = !self.contents.analyze_fails;
        Ok(ExplainOutput {
            json_plan: json!([{"Plan": {"Node Type": "Seq Scan", "Actual Rows": if analyzed { 1 } else { 0 }}}]),
            text_plan: "Seq Scan on fake  (cost=0.00..1.01 rows=1 width=4)".to_string(),
            analyzed,
        })
    }

    async fn close(self: Box<Self>) -> CoreResult<()> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
