//! Conversation restart

use async_trait::async_trait;
use eddi_core::{Action, ActionName, ActionResponse, Event, Tracker};

/// Starts the database selection over
#[derive(Debug, Default, Clone, Copy)]
pub struct Restart;

#[async_trait]
impl Action for Restart {
    fn name(&self) -> ActionName {
        ActionName::Restart
    }

    async fn run(&self, _tracker: &Tracker) -> ActionResponse {
        let mut response = ActionResponse::message("Let's start over with the database selection process.");
        response.push_event(Event::Restart);
        response
    }
}
