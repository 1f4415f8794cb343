//! Action contract
//!
//! The dialogue manager names the action it wants by string. That string is
//! parsed once into an [`ActionName`]; handlers are looked up by the enum.

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;

use crate::domain::dialogue::{ActionResponse, Tracker};
use crate::CoreError;

/// Every action the server can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionName {
    /// `action_recommend_database`
    RecommendDatabase,
    /// `action_recommend_database_create_ticket`
    RecommendDatabaseCreateTicket,
    /// `action_submit_request`
    SubmitRequest,
    /// `action_restart`
    Restart,
    /// `action_submit_database`
    SubmitDatabase,
    /// `validate_create_database_form`
    ValidateCreateDatabaseForm,
    /// `action_submit_delete_database`
    SubmitDeleteDatabase,
    /// `validate_explore_schema_form`
    ValidateExploreSchemaForm,
    /// `action_submit_schema_explore`
    SubmitSchemaExplore,
    /// `action_fetch_available_objects`
    FetchAvailableObjects,
    /// `action_fetch_object_definitions`
    FetchObjectDefinitions,
    /// `validate_analyze_query_form`
    ValidateAnalyzeQueryForm,
    /// `action_submit_query_analysis`
    SubmitQueryAnalysis,
}

impl ActionName {
    /// Every action name
    pub const ALL: [ActionName; 13] = [
        ActionName::RecommendDatabase,
        ActionName::RecommendDatabaseCreateTicket,
        ActionName::SubmitRequest,
        ActionName::Restart,
        ActionName::SubmitDatabase,
        ActionName::ValidateCreateDatabaseForm,
        ActionName::SubmitDeleteDatabase,
        ActionName::ValidateExploreSchemaForm,
        ActionName::SubmitSchemaExplore,
        ActionName::FetchAvailableObjects,
        ActionName::FetchObjectDefinitions,
        ActionName::ValidateAnalyzeQueryForm,
        ActionName::SubmitQueryAnalysis,
    ];

    /// Name as registered with the dialogue manager
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionName::RecommendDatabase => "action_recommend_database",
            ActionName::RecommendDatabaseCreateTicket => "action_recommend_database_create_ticket",
            ActionName::SubmitRequest => "action_submit_request",
            ActionName::Restart => "action_restart",
            ActionName::SubmitDatabase => "action_submit_database",
            ActionName::ValidateCreateDatabaseForm => "validate_create_database_form",
            ActionName::SubmitDeleteDatabase => "action_submit_delete_database",
            ActionName::ValidateExploreSchemaForm => "validate_explore_schema_form",
            ActionName::SubmitSchemaExplore => "action_submit_schema_explore",
            ActionName::FetchAvailableObjects => "action_fetch_available_objects",
            ActionName::FetchObjectDefinitions => "action_fetch_object_definitions",
            ActionName::ValidateAnalyzeQueryForm => "validate_analyze_query_form",
            ActionName::SubmitQueryAnalysis => "action_submit_query_analysis",
        }
    }
}

impl FromStr for ActionName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionName::ALL
            .iter()
            .copied()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| CoreError::NotFound(format!("Action '{}'", s)))
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dialogue action.
///
/// `run` never fails: faults are reported to the user as messages so the
/// dialogue manager always gets a well formed response.
#[async_trait]
pub trait Action: Send + Sync {
    /// Name this action answers to
    fn name(&self) -> ActionName;

    /// Run one turn
    async fn run(&self, tracker: &Tracker) -> ActionResponse;
}
