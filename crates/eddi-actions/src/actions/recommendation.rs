//! Recommendation and ticket submission actions

use async_trait::async_trait;
use eddi_core::{
    recommend_flat, recommend_tree, Action, ActionName, ActionResponse, BotMessage, Button,
    CoreResult, DecisionTable, Event, FlatSlots, Recommendation, TicketId, TicketIdGenerator,
    Tracker, TreeSlots,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::internal_fault;

/// Run the configured decision table over the tracker's slots
fn recommend(table: DecisionTable, tracker: &Tracker) -> CoreResult<Recommendation> {
    Ok(match table {
        DecisionTable::Flat => recommend_flat(&FlatSlots::from_tracker(tracker)?),
        DecisionTable::Tree => recommend_tree(&TreeSlots::from_tracker(tracker)?),
    })
}

/// `action_recommend_database`
pub struct RecommendDatabase {
    table: DecisionTable,
    tickets: Arc<dyn TicketIdGenerator>,
}

impl RecommendDatabase {
    /// Create the action for a decision table
    pub fn new(table: DecisionTable, tickets: Arc<dyn TicketIdGenerator>) -> Self {
        Self { table, tickets }
    }

    fn flat_response(rec: &Recommendation) -> ActionResponse {
        let cost = rec.estimated_cost.clone().unwrap_or_default();
        let mut response = ActionResponse::message(format!(
            "Based on your answers I recommend {}. Estimated cost: {}.",
            rec.qualified_name(),
            cost
        ));
        response
            .push_event(Event::slot("recommended_database", rec.recommended_database.as_str()))
            .push_event(Event::slot("estimated_cost", cost))
            .push_event(Event::slot(
                "deployment_qualifier",
                rec.deployment_qualifier
                    .map(|q| Value::from(q.label()))
                    .unwrap_or(Value::Null),
            ));
        response
    }

    fn tree_response(rec: &Recommendation) -> ActionResponse {
        let reason = rec.reason.clone().unwrap_or_default();
        let ticket_id = rec.ticket_id.as_ref().map(TicketId::as_str).unwrap_or_default();
        let mut response = ActionResponse::empty();
        response
            .push_event(Event::slot("recommended_database", rec.recommended_database.as_str()))
            .push_event(Event::slot("recommendation_reason", reason.as_str()))
            .push_event(Event::slot("ticket_id", ticket_id))
            .utter(
                BotMessage::text(format!(
                    "I recommend {}. {} Would you like to create ticket {} for this request?",
                    rec.recommended_database, reason, ticket_id
                ))
                .with_buttons(vec![
                    Button::new("Yes, create ticket", "/confirm_database_selection"),
                    Button::new("No, let's try again", "/restart"),
                ]),
            );
        response
    }
}

#[async_trait]
impl Action for RecommendDatabase {
    fn name(&self) -> ActionName {
        ActionName::RecommendDatabase
    }

    async fn run(&self, tracker: &Tracker) -> ActionResponse {
        let rec = match recommend(self.table, tracker) {
            Ok(rec) => rec,
            Err(err) => return internal_fault(self.name(), &err),
        };

        match self.table {
            DecisionTable::Flat => {
                info!(
                    recommendation = %rec.qualified_name(),
                    estimated_cost = rec.estimated_cost.as_deref().unwrap_or_default(),
                    "Recommendation computed"
                );
                Self::flat_response(&rec)
            }
            DecisionTable::Tree => {
                let rec = rec.with_ticket(self.tickets.next_ticket_id());
                info!(
                    recommendation = %rec.recommended_database,
                    ticket_id = ?rec.ticket_id,
                    "Recommendation computed"
                );
                Self::tree_response(&rec)
            }
        }
    }
}

/// `action_recommend_database_create_ticket`
pub struct RecommendDatabaseCreateTicket {
    table: DecisionTable,
    tickets: Arc<dyn TicketIdGenerator>,
}

impl RecommendDatabaseCreateTicket {
    /// Create the action for a decision table
    pub fn new(table: DecisionTable, tickets: Arc<dyn TicketIdGenerator>) -> Self {
        Self { table, tickets }
    }

    fn compose(&self, tracker: &Tracker) -> CoreResult<(TicketId, String)> {
        let database = match tracker.slot_text("recommended_database")? {
            Some(database) => database,
            None => recommend(self.table, tracker)?.recommended_database,
        };
        let ticket_id = match tracker.slot_text("ticket_id")? {
            Some(id) if !id.trim().is_empty() => TicketId::from_slot(id),
            _ => self.tickets.next_ticket_id(),
        };

        let mut text = format!(
            "Your database request for {} has been submitted. Jira ticket {} has been created and assigned to the appropriate approver. You will receive notifications about the status of your request.",
            database, ticket_id
        );

        if self.table == DecisionTable::Tree {
            let slots = TreeSlots::from_tracker(tracker)?;
            let details = [
                ("Application owner", slots.app_architect),
                ("Epic", slots.epic_link),
                ("Architecture reviewed", slots.is_reviewed),
                ("SysID available", slots.has_sysid),
            ];
            for (label, value) in details {
                if let Some(value) = value {
                    text.push_str(&format!(" {}: {}.", label, value));
                }
            }
        }

        Ok((ticket_id, text))
    }
}

#[async_trait]
impl Action for RecommendDatabaseCreateTicket {
    fn name(&self) -> ActionName {
        ActionName::RecommendDatabaseCreateTicket
    }

    async fn run(&self, tracker: &Tracker) -> ActionResponse {
        match self.compose(tracker) {
            Ok((ticket_id, text)) => {
                info!(ticket_id = %ticket_id, "Ticket submitted");
                let mut response = ActionResponse::message(text);
                response.push_event(Event::slot("ticket_id", ticket_id.as_str()));
                response
            }
            Err(err) => internal_fault(self.name(), &err),
        }
    }
}
