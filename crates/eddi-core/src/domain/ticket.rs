//! Ticket identifiers
//!
//! Ids are drawn from a four digit space (`DB-1000` .. `DB-9999`), which
//! leaves only 9000 distinct values. Nothing here deduplicates them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Synthetic ticket identifier, e.g. `DB-4821`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    /// Ticket id for a number, `DB-{n}`
    pub fn from_number(n: u16) -> Self {
        TicketId(format!("DB-{}", n))
    }

    /// Wrap an id carried in a slot
    pub fn from_slot(value: impl Into<String>) -> Self {
        TicketId(value.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

/// Source of fresh ticket ids
pub trait TicketIdGenerator: Send + Sync {
    /// Produce the next ticket id
    fn next_ticket_id(&self) -> TicketId;
}

/// Uniformly random ticket ids in `DB-1000..=DB-9999`
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTicketIds;

impl TicketIdGenerator for RandomTicketIds {
    fn next_ticket_id(&self) -> TicketId {
        TicketId::from_number(rand::thread_rng().gen_range(1000..=9999))
    }
}
