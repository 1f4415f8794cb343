//! Database request actions: recommendation hand-off, create and delete

use async_trait::async_trait;
use eddi_core::domain::validation::is_valid_database_name;
use eddi_core::{
    Action, ActionName, ActionResponse, BotMessage, CoreResult, Event, TicketId,
    TicketIdGenerator, Tracker,
};
use std::sync::Arc;
use tracing::info;

use super::internal_fault;

const INVALID_DATABASE_NAME: &str = "Invalid database name. Names must start with a letter, contain only letters, numbers, underscores, and hyphens, and be 3-63 characters long. Please try again.";

/// Slot text, or `None` rendered the way the confirmation shows it
fn shown(tracker: &Tracker, slot: &str) -> CoreResult<String> {
    Ok(tracker.slot_text(slot)?.unwrap_or_else(|| "None".to_string()))
}

fn create_request_text(tracker: &Tracker) -> CoreResult<String> {
    Ok(format!(
        "Your request to create *{}* version *{}* with SysID *{}* has been submitted!",
        shown(tracker, "database_name")?,
        shown(tracker, "database_version")?,
        shown(tracker, "sysid")?
    ))
}

fn delete_request_text(tracker: &Tracker) -> CoreResult<String> {
    Ok(format!(
        "Your request to delete *{}* instance *{}* with SYSID *{}* has been submitted!",
        shown(tracker, "database_name")?,
        shown(tracker, "database_instance")?,
        shown(tracker, "sysid")?
    ))
}

/// `action_submit_request`
///
/// Files the request for the recommendation held in the slots. Every call
/// draws a fresh ticket id; no slots are written.
pub struct SubmitRequest {
    tickets: Arc<dyn TicketIdGenerator>,
}

impl SubmitRequest {
    /// Create the action
    pub fn new(tickets: Arc<dyn TicketIdGenerator>) -> Self {
        Self { tickets }
    }

    fn submit(&self, tracker: &Tracker) -> CoreResult<(TicketId, String)> {
        let database = tracker.slot_text("recommended_database")?;
        let estimated_cost = tracker.slot_text("estimated_cost")?;
        let ticket_id = self.tickets.next_ticket_id();

        info!(
            sender_id = %tracker.sender_id,
            ticket_id = %ticket_id,
            recommended_database = database.as_deref().unwrap_or_default(),
            estimated_cost = estimated_cost.as_deref().unwrap_or_default(),
            "Database request submitted"
        );

        let text = format!(
            "Your database request has been submitted. Jira ticket {} has been created and assigned to the appropriate approver. You will receive notifications about the status of your request.",
            ticket_id
        );
        Ok((ticket_id, text))
    }
}

#[async_trait]
impl Action for SubmitRequest {
    fn name(&self) -> ActionName {
        ActionName::SubmitRequest
    }

    async fn run(&self, tracker: &Tracker) -> ActionResponse {
        match self.submit(tracker) {
            Ok((_, text)) => ActionResponse::message(text),
            Err(err) => internal_fault(self.name(), &err),
        }
    }
}

/// `action_submit_database`
#[derive(Debug, Default, Clone, Copy)]
pub struct SubmitDatabase;

#[async_trait]
impl Action for SubmitDatabase {
    fn name(&self) -> ActionName {
        ActionName::SubmitDatabase
    }

    async fn run(&self, tracker: &Tracker) -> ActionResponse {
        match create_request_text(tracker) {
            Ok(text) => {
                info!(sender_id = %tracker.sender_id, "Create database request submitted");
                ActionResponse::message(text)
            }
            Err(err) => internal_fault(self.name(), &err),
        }
    }
}

/// `validate_create_database_form`
#[derive(Debug, Default, Clone, Copy)]
pub struct ValidateCreateDatabaseForm;

#[async_trait]
impl Action for ValidateCreateDatabaseForm {
    fn name(&self) -> ActionName {
        ActionName::ValidateCreateDatabaseForm
    }

    async fn run(&self, tracker: &Tracker) -> ActionResponse {
        let mut response = ActionResponse::empty();
        match tracker.slot_text("database_name") {
            Ok(None) => {}
            Ok(Some(name)) if is_valid_database_name(&name) => {
                response.push_event(Event::slot("database_name", name));
            }
            Ok(Some(_)) | Err(_) => {
                response
                    .utter(BotMessage::text(INVALID_DATABASE_NAME))
                    .push_event(Event::unset("database_name"));
            }
        }
        response
    }
}

/// `action_submit_delete_database`
#[derive(Debug, Default, Clone, Copy)]
pub struct SubmitDeleteDatabase;

#[async_trait]
impl Action for SubmitDeleteDatabase {
    fn name(&self) -> ActionName {
        ActionName::SubmitDeleteDatabase
    }

    async fn run(&self, tracker: &Tracker) -> ActionResponse {
        match delete_request_text(tracker) {
            Ok(text) => {
                info!(sender_id = %tracker.sender_id, "Delete database request submitted");
                ActionResponse::message(text)
            }
            Err(err) => internal_fault(self.name(), &err),
        }
    }
}
