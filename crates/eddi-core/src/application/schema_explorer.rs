//! Schema descriptor builder

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::catalog::{CatalogProvider, CatalogSession, ExplainOutput, ObjectCategory};
use crate::domain::schema::{
    host_endpoint, ColumnDefinition, DefinitionRecord, ObjectDefinitions, ObjectSelection,
    SchemaDescriptor,
};
use crate::CoreResult;

/// Build a descriptor listing object names per requested category.
///
/// One catalog query per category. A category whose query fails is recorded
/// under `errors` and left out of `objects`; the pass only fails when every
/// requested category failed.
pub async fn describe_schema(
    session: &mut dyn CatalogSession,
    database_host_endpoint: &str,
    categories: &[ObjectCategory],
) -> CoreResult<SchemaDescriptor> {
    let mut descriptor = SchemaDescriptor::new(database_host_endpoint);
    let mut first_error = None;

    for &category in categories {
        if descriptor.objects.contains_key(&category) || descriptor.errors.contains_key(&category) {
            continue;
        }
        match session.object_names(category).await {
            Ok(names) => {
                debug!(%category, count = names.len(), "Listed catalog objects");
                descriptor.objects.insert(category, names);
            }
            Err(err) => {
                warn!(%category, error = %err, "Catalog listing failed");
                descriptor.errors.insert(category, err.to_string());
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) if descriptor.objects.is_empty() => Err(err),
        _ => Ok(descriptor),
    }
}

/// Expand a selection into detail records.
///
/// One lookup per selected object. A lookup that fails or finds nothing
/// yields the "not available" record, so this never fails.
pub async fn expand_definitions(
    session: &mut dyn CatalogSession,
    database_host_endpoint: &str,
    selection: &ObjectSelection,
) -> ObjectDefinitions {
    let mut definitions = ObjectDefinitions::new(database_host_endpoint);

    for (&category, names) in selection {
        if names.is_empty() {
            continue;
        }
        let mut records = Vec::with_capacity(names.len());
        for name in names {
            let record = match expand_one(session, category, name).await {
                Ok(Some(record)) => record,
                Ok(None) => DefinitionRecord::unavailable(name.clone()),
                Err(err) => {
                    warn!(%category, object = %name, error = %err, "Definition lookup failed");
                    DefinitionRecord::unavailable(name.clone())
                }
            };
            records.push(record);
        }
        definitions.definitions.insert(category, records);
    }

    definitions
}

async fn expand_one(
    session: &mut dyn CatalogSession,
    category: ObjectCategory,
    name: &str,
) -> CoreResult<Option<DefinitionRecord>> {
    if category.is_relation() {
        let columns = session.columns(name).await?;
        return Ok(Some(DefinitionRecord::Relation {
            name: name.to_string(),
            columns: columns.into_iter().map(ColumnDefinition::from).collect(),
        }));
    }

    if category.is_routine() {
        return Ok(session.routine(category, name).await?.map(DefinitionRecord::from));
    }

    let record = match category {
        ObjectCategory::Sequences => session.sequence(name).await?.map(DefinitionRecord::from),
        ObjectCategory::Schemas => session.schema(name).await?.map(DefinitionRecord::from),
        _ => session
            .definition(category, name)
            .await?
            .map(|info| DefinitionRecord::Definition {
                name: info.name,
                definition: info.definition,
            }),
    };
    Ok(record)
}

/// Runs catalog work against connections opened per call
#[derive(Clone)]
pub struct SchemaExplorer {
    provider: Arc<dyn CatalogProvider>,
}

impl SchemaExplorer {
    /// Create an explorer over a provider
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self { provider }
    }

    /// Check that a connection string can be used
    pub async fn probe(&self, connection_string: &str) -> CoreResult<()> {
        self.provider.probe(connection_string).await
    }

    /// Open a session, describe the requested categories, close the session
    pub async fn describe(
        &self,
        connection_string: &str,
        categories: &[ObjectCategory],
    ) -> CoreResult<SchemaDescriptor> {
        let host = host_endpoint(connection_string);
        let mut session = self.provider.open(connection_string).await?;
        let result = describe_schema(session.as_mut(), &host, categories).await;
        release(session).await;
        result
    }

    /// Open a session, expand the selection, close the session
    pub async fn expand(
        &self,
        connection_string: &str,
        database_host_endpoint: &str,
        selection: &ObjectSelection,
    ) -> CoreResult<ObjectDefinitions> {
        let mut session = self.provider.open(connection_string).await?;
        let definitions = expand_definitions(session.as_mut(), database_host_endpoint, selection).await;
        release(session).await;
        Ok(definitions)
    }

    /// Open a session, explain a query, close the session
    pub async fn explain(&self, connection_string: &str, sql: &str) -> CoreResult<ExplainOutput> {
        let mut session = self.provider.open(connection_string).await?;
        let result = session.explain(sql).await;
        release(session).await;
        result
    }
}

async fn release(session: Box<dyn CatalogSession>) {
    if let Err(err) = session.close().await {
        warn!(error = %err, "Failed to close catalog session");
    }
}

impl std::fmt::Debug for SchemaExplorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaExplorer").finish_non_exhaustive()
    }
}

impl From<Arc<dyn CatalogProvider>> for SchemaExplorer {
    fn from(provider: Arc<dyn CatalogProvider>) -> Self {
        Self::new(provider)
    }
}
