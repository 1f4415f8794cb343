use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgConnection;
use sqlx::Connection;
use tracing::{debug, warn};

use eddi_core::{
    CatalogSession, ColumnInfo, CoreError, CoreResult, ExplainOutput, ObjectCategory,
    ObjectDefinitionInfo, RoutineInfo, SchemaInfo, SequenceInfo,
};

use crate::queries;

fn query_error(what: &str, e: sqlx::Error) -> CoreError {
    CoreError::CatalogQueryError(format!("Failed to {}: {}", what, e))
}

/// Plan from the ANALYZE attempt, or `None` when a plain EXPLAIN must be tried
fn analyzed_plan(result: Result<(Value, String), sqlx::Error>) -> Option<ExplainOutput> {
    match result {
        Ok((json_plan, text_plan)) => Some(ExplainOutput {
            json_plan,
            text_plan,
            analyzed: true,
        }),
        Err(e) => {
            debug!(error = %e, "EXPLAIN ANALYZE failed, retrying without ANALYZE");
            None
        }
    }
}

fn plain_plan((json_plan, text_plan): (Value, String)) -> ExplainOutput {
    ExplainOutput {
        json_plan,
        text_plan,
        analyzed: false,
    }
}

/// Catalog session over a single PostgreSQL connection
pub struct PostgresCatalogSession {
    conn: PgConnection,
}

impl PostgresCatalogSession {
    pub(crate) fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    async fn plan(conn: &mut PgConnection, sql: &str, analyze: bool) -> Result<(Value, String), sqlx::Error> {
        let json_plan = sqlx::query_scalar::<_, Value>(&queries::explain_json(sql, analyze))
            .fetch_one(&mut *conn)
            .await?;
        let text_rows = sqlx::query_scalar::<_, String>(&queries::explain_text(sql, analyze))
            .fetch_all(&mut *conn)
            .await?;
        Ok((json_plan, text_rows.join("\n")))
    }
}

#[async_trait]
impl CatalogSession for PostgresCatalogSession {
    async fn object_names(&mut self, category: ObjectCategory) -> CoreResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(queries::listing(category))
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| query_error(&format!("list {}", category), e))
    }

    async fn columns(&mut self, relation: &str) -> CoreResult<Vec<ColumnInfo>> {
        let rows = sqlx::query_as::<_, (String, String, Option<i32>, String)>(queries::COLUMNS)
            .bind(relation)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| query_error(&format!("read columns of {}", relation), e))?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, character_maximum_length, is_nullable)| ColumnInfo {
                name,
                data_type,
                character_maximum_length,
                is_nullable,
            })
            .collect())
    }

    async fn routine(&mut self, category: ObjectCategory, name: &str) -> CoreResult<Option<RoutineInfo>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(queries::ROUTINE)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| query_error(&format!("read {} {}", category, name), e))?;

        Ok(row.map(|(name, arguments, return_type, source)| RoutineInfo {
            name,
            arguments,
            return_type,
            source,
        }))
    }

    async fn sequence(&mut self, name: &str) -> CoreResult<Option<SequenceInfo>> {
        let row = sqlx::query_as::<_, (String, Option<String>, Option<String>)>(queries::SEQUENCE)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| query_error(&format!("read sequence {}", name), e))?;

        Ok(row.map(|(name, sequence_name, column_name)| SequenceInfo {
            name,
            sequence_name,
            column_name,
        }))
    }

    async fn definition(
        &mut self,
        category: ObjectCategory,
        name: &str,
    ) -> CoreResult<Option<ObjectDefinitionInfo>> {
        let sql = queries::definition(category).ok_or_else(|| {
            CoreError::ValidationError(format!("{} have no reconstructed definition", category))
        })?;

        let row = sqlx::query_as::<_, (String, String)>(sql)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| query_error(&format!("read {} {}", category, name), e))?;

        Ok(row.map(|(name, definition)| ObjectDefinitionInfo { name, definition }))
    }

    async fn schema(&mut self, name: &str) -> CoreResult<Option<SchemaInfo>> {
        let row = sqlx::query_as::<_, (String, String)>(queries::SCHEMA)
            .bind(name)
            .fetch_optional(&mut self.conn)
            .await
            .map_err(|e| query_error(&format!("read schema {}", name), e))?;

        Ok(row.map(|(name, owner)| SchemaInfo { name, owner }))
    }

    async fn explain(&mut self, sql: &str) -> CoreResult<ExplainOutput> {
        // ANALYZE executes the statement, so it runs in a transaction that is
        // always rolled back.
        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| query_error("start plan transaction", e))?;
        let analyzed = Self::plan(&mut tx, sql, true).await;
        if let Err(e) = tx.rollback().await {
            warn!(error = %e, "Failed to roll back plan transaction");
        }

        if let Some(output) = analyzed_plan(analyzed) {
            return Ok(output);
        }

        let plan = Self::plan(&mut self.conn, sql, false)
            .await
            .map_err(|e| query_error("explain query", e))?;
        Ok(plain_plan(plan))
    }

    async fn close(self: Box<Self>) -> CoreResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| CoreError::CatalogConnectionError(format!("Failed to close connection: {}", e)))
    }
}
