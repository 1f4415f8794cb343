//!
//! Dialogue actions for the EDDI database assistant
//!

use eddi_core::{
    Action, ActionName, ActionResponse, DecisionTable, SchemaExplorer,
    TicketIdGenerator, Tracker,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info_span, Instrument};

pub mod actions;

use crate::actions::{
    FetchAvailableObjects, FetchObjectDefinitions, RecommendDatabase,
    RecommendDatabaseCreateTicket, Restart, SubmitDatabase, SubmitDeleteDatabase,
    SubmitQueryAnalysis, SubmitRequest, SubmitSchemaExplore, ValidateAnalyzeQueryForm,
    ValidateCreateDatabaseForm, ValidateExploreSchemaForm,
};

/// Dispatch failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No action is registered under the requested name
    #[error("No registered action found for name '{0}'.")]
    UnknownAction(String),
}

/// Settings shared by the standard actions
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionSettings {
    /// Decision table used by the recommendation actions
    pub decision_table: DecisionTable,
}

/// Static mapping from action name to handler, built once at startup
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<ActionName, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every standard action
    pub fn standard(
        settings: ActionSettings,
        explorer: SchemaExplorer,
        tickets: Arc<dyn TicketIdGenerator>,
    ) -> Self {
        let table = settings.decision_table;
        let mut registry = Self::new();
        registry
            .register(Arc::new(RecommendDatabase::new(table, Arc::clone(&tickets))))
            .register(Arc::new(RecommendDatabaseCreateTicket::new(table, Arc::clone(&tickets))))
            .register(Arc::new(SubmitRequest::new(tickets)))
            .register(Arc::new(Restart))
            .register(Arc::new(SubmitDatabase))
            .register(Arc::new(ValidateCreateDatabaseForm))
            .register(Arc::new(SubmitDeleteDatabase))
            .register(Arc::new(ValidateExploreSchemaForm))
            .register(Arc::new(SubmitSchemaExplore::new(explorer.clone())))
            .register(Arc::new(FetchAvailableObjects))
            .register(Arc::new(FetchObjectDefinitions::new(explorer.clone())))
            .register(Arc::new(ValidateAnalyzeQueryForm::new(explorer.clone())))
            .register(Arc::new(SubmitQueryAnalysis::new(explorer)));
        registry
    }

    /// Register (or replace) a handler under its own name
    pub fn register(&mut self, action: Arc<dyn Action>) -> &mut Self {
        self.actions.insert(action.name(), action);
        self
    }

    /// Handler for a name
    pub fn get(&self, name: ActionName) -> Option<Arc<dyn Action>> {
        self.actions.get(&name).cloned()
    }

    /// Registered names, in declaration order
    pub fn names(&self) -> Vec<ActionName> {
        self.actions.keys().copied().collect()
    }

    /// Resolve a wire name and run the handler
    pub async fn dispatch(&self, name: &str, tracker: &Tracker) -> Result<ActionResponse, DispatchError> {
        let action = name
            .parse::<ActionName>()
            .ok()
            .and_then(|parsed| self.get(parsed))
            .ok_or_else(|| DispatchError::UnknownAction(name.to_string()))?;

        let span = info_span!("action", action = %name, sender_id = %tracker.sender_id);
        let response = action.run(tracker).instrument(span).await;
        tracing::debug!(
            action = %name,
            events = response.events.len(),
            messages = response.responses.len(),
            "Action finished"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eddi_core::test_utils::FakeCatalog;
    use eddi_core::{CatalogProvider, RandomTicketIds};

    fn registry() -> ActionRegistry {
        let provider: Arc<dyn CatalogProvider> = Arc::new(FakeCatalog::new());
        ActionRegistry::standard(
            ActionSettings::default(),
            SchemaExplorer::new(provider),
            Arc::new(RandomTicketIds),
        )
    }

    #[test]
    fn test_standard_registry_covers_every_name() {
        assert_eq!(registry().names(), ActionName::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_dispatch_unknown_action() {
        let err = registry()
            .dispatch("action_process_object_list", &Tracker::new("u"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "No registered action found for name 'action_process_object_list'."
        );
    }

    #[tokio::test]
    async fn test_dispatch_runs_handler() {
        let response = registry()
            .dispatch("action_restart", &Tracker::new("u"))
            .await
            .unwrap();
        assert_eq!(response.events, vec![eddi_core::Event::Restart]);
    }
}
