//! Dialogue manager wire shapes
//!
//! The dialogue manager hands every action a [`Tracker`] snapshot of the
//! conversation and expects back a list of [`Event`]s plus zero or more
//! [`BotMessage`]s to display.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::{CoreError, CoreResult};

/// Conversation state passed to an action
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tracker {
    /// Conversation (sender) identifier
    #[serde(default)]
    pub sender_id: String,

    /// Current slot values
    #[serde(default)]
    pub slots: HashMap<String, Value>,

    /// Most recent user message
    #[serde(default)]
    pub latest_message: LatestMessage,
}

/// The latest user utterance
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LatestMessage {
    /// Raw text, if any
    #[serde(default)]
    pub text: Option<String>,
}

impl Tracker {
    /// Create an empty tracker for a sender
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: sender_id.into(),
            ..Self::default()
        }
    }

    /// Builder helper to set a slot
    pub fn with_slot(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.slots.insert(name.into(), value.into());
        self
    }

    /// Builder helper to set the latest user message
    pub fn with_latest_text(mut self, text: impl Into<String>) -> Self {
        self.latest_message.text = Some(text.into());
        self
    }

    /// Raw slot value; a JSON `null` counts as unset
    pub fn slot(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).filter(|value| !value.is_null())
    }

    /// Read a slot as text.
    ///
    /// Strings are returned as-is, booleans and numbers are rendered; lists
    /// and objects are rejected with [`CoreError::SlotTypeError`].
    pub fn slot_text(&self, name: &str) -> CoreResult<Option<String>> {
        match self.slot(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(CoreError::SlotTypeError {
                name: name.to_string(),
                expected: "a string",
            }),
        }
    }

    /// Text of the latest user message, empty when absent
    pub fn latest_text(&self) -> &str {
        self.latest_message.text.as_deref().unwrap_or("")
    }
}

/// Event returned by an action to the dialogue manager
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Set (or, with a `null` value, unset) a slot
    #[serde(rename = "slot")]
    SlotSet {
        /// Slot name
        name: String,
        /// New value
        value: Value,
    },

    /// Reset the whole conversation
    Restart,
}

impl Event {
    /// Slot update event
    pub fn slot(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Event::SlotSet {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Slot reset event, used by form validation to re-prompt
    pub fn unset(name: impl Into<String>) -> Self {
        Event::SlotSet {
            name: name.into(),
            value: Value::Null,
        }
    }

    /// Whether this event mutates a slot
    pub fn is_slot_update(&self) -> bool {
        matches!(self, Event::SlotSet { .. })
    }
}

/// Quick-reply button attached to a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Button {
    /// Label shown to the user
    pub title: String,
    /// Payload sent back when clicked
    pub payload: String,
}

impl Button {
    /// Create a button
    pub fn new(title: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            payload: payload.into(),
        }
    }
}

/// Message displayed to the user
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BotMessage {
    /// Plain text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Quick-reply buttons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<Button>,

    /// Out-of-band structured payload (forms, downloads)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<Value>,
}

impl BotMessage {
    /// Plain text message
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Structured payload message
    pub fn custom(custom: Value) -> Self {
        Self {
            custom: Some(custom),
            ..Self::default()
        }
    }

    /// Attach buttons
    pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
        self.buttons = buttons;
        self
    }
}

/// Outcome of one action run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionResponse {
    /// Events for the dialogue manager
    #[serde(default)]
    pub events: Vec<Event>,

    /// Messages to display
    #[serde(default)]
    pub responses: Vec<BotMessage>,
}

impl ActionResponse {
    /// Empty response: no events, no messages
    pub fn empty() -> Self {
        Self::default()
    }

    /// Response carrying a single text message and no events
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            events: Vec::new(),
            responses: vec![BotMessage::text(text)],
        }
    }

    /// Queue a message
    pub fn utter(&mut self, message: BotMessage) -> &mut Self {
        self.responses.push(message);
        self
    }

    /// Queue an event
    pub fn push_event(&mut self, event: Event) -> &mut Self {
        self.events.push(event);
        self
    }

    /// Value of the last slot update for `name`, if any
    pub fn slot_value(&self, name: &str) -> Option<&Value> {
        self.events.iter().rev().find_map(|event| match event {
            Event::SlotSet { name: n, value } if n == name => Some(value),
            _ => None,
        })
    }
}
