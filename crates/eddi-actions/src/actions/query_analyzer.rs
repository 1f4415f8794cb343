//! Query analysis actions

use async_trait::async_trait;
use chrono::Utc;
use eddi_core::domain::validation::looks_like_sql;
use eddi_core::{
    Action, ActionName, ActionResponse, BotMessage, CoreError, CoreResult, Event, ExplainOutput,
    SchemaExplorer, Tracker,
};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::download_url;
use super::schema_explorer::{connection_answer, ConnectionAnswer, INVALID_CONNECTION_STRING};

const NO_ANALYZE_NOTE: &str = "Plan generated without ANALYZE option to avoid query execution.";

/// `validate_analyze_query_form`
#[derive(Debug, Clone)]
pub struct ValidateAnalyzeQueryForm {
    explorer: SchemaExplorer,
}

impl ValidateAnalyzeQueryForm {
    /// Create the action over a schema explorer used for connectivity probes
    pub fn new(explorer: SchemaExplorer) -> Self {
        Self { explorer }
    }

    async fn validate_connection_string(&self, tracker: &Tracker, response: &mut ActionResponse) {
        match connection_answer(tracker) {
            ConnectionAnswer::Missing => {}
            ConnectionAnswer::Malformed => {
                response
                    .utter(BotMessage::text(INVALID_CONNECTION_STRING))
                    .push_event(Event::unset("connection_string"));
            }
            ConnectionAnswer::WellFormed(value) => match self.explorer.probe(&value).await {
                Ok(()) => {
                    response.push_event(Event::slot("connection_string", value));
                }
                Err(err) => {
                    warn!(error = %err, "Connectivity probe failed");
                    response
                        .utter(BotMessage::text(format!("Could not connect to the database: {}", err)))
                        .push_event(Event::unset("connection_string"));
                }
            },
        }
    }

    fn validate_sql_query(tracker: &Tracker, response: &mut ActionResponse) {
        let answer = match tracker.slot("sql_query") {
            Some(answer) => answer,
            None => return,
        };
        let message = match answer {
            Value::String(sql) if sql.trim().is_empty() => "Please provide a SQL query.",
            Value::String(sql) if looks_like_sql(sql) => {
                response.push_event(Event::slot("sql_query", sql.as_str()));
                return;
            }
            _ => "Invalid SQL syntax. Please re-enter a valid query.",
        };
        response
            .utter(BotMessage::text(message))
            .push_event(Event::unset("sql_query"));
    }
}

#[async_trait]
impl Action for ValidateAnalyzeQueryForm {
    fn name(&self) -> ActionName {
        ActionName::ValidateAnalyzeQueryForm
    }

    async fn run(&self, tracker: &Tracker) -> ActionResponse {
        let mut response = ActionResponse::empty();
        self.validate_connection_string(tracker, &mut response).await;
        Self::validate_sql_query(tracker, &mut response);
        response
    }
}

/// `action_submit_query_analysis`
#[derive(Debug, Clone)]
pub struct SubmitQueryAnalysis {
    explorer: SchemaExplorer,
}

impl SubmitQueryAnalysis {
    /// Create the action over a schema explorer
    pub fn new(explorer: SchemaExplorer) -> Self {
        Self { explorer }
    }

    /// Plan document offered for download
    fn plan_document(sql: &str, plan: ExplainOutput) -> Value {
        let mut execution_plan = json!({
            "json_plan": plan.json_plan,
            "text_plan": plan.text_plan,
        });
        if !plan.analyzed {
            execution_plan["note"] = Value::from(NO_ANALYZE_NOTE);
        }
        json!({
            "metadata": {
                "query": sql,
                "generated_at": Utc::now().to_rfc3339(),
            },
            "execution_plan": execution_plan,
        })
    }

    async fn analyze(&self, tracker: &Tracker, response: &mut ActionResponse) -> CoreResult<()> {
        let connection_string = tracker
            .slot_text("connection_string")?
            .ok_or_else(|| CoreError::ValidationError("no connection string was provided".to_string()))?;
        let sql = tracker
            .slot_text("sql_query")?
            .ok_or_else(|| CoreError::ValidationError("no SQL query was provided".to_string()))?;

        let plan = self.explorer.explain(&connection_string, &sql).await?;
        let analyzed = plan.analyzed;
        let document = Self::plan_document(&sql, plan);

        let file_name = format!("execution_plan_{}.json", uuid::Uuid::new_v4());
        info!(file_name = %file_name, analyzed, "Execution plan generated");

        response
            .push_event(Event::slot("execution_plan_path", download_url(&file_name)))
            .utter(BotMessage::text("Query analysis complete! Here's your execution plan:"))
            .utter(BotMessage::custom(json!({
                "text": "Download the complete execution plan:",
                "form_type": "download",
                "file_name": file_name,
                "objects": document,
            })));
        Ok(())
    }
}

#[async_trait]
impl Action for SubmitQueryAnalysis {
    fn name(&self) -> ActionName {
        ActionName::SubmitQueryAnalysis
    }

    async fn run(&self, tracker: &Tracker) -> ActionResponse {
        let mut response =
            ActionResponse::message("Request in Progress... Please wait while we analyze your query.");
        if let Err(err) = self.analyze(tracker, &mut response).await {
            warn!(error = %err, "Query analysis failed");
            response.utter(BotMessage::text(format!("Error analyzing query: {}", err)));
        }
        response
    }
}
