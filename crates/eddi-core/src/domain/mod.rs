/// Dialogue manager wire shapes: tracker, events, bot messages
pub mod dialogue;

/// Typed slot sets for the two recommendation decision tables
pub mod slots;

/// Database recommendation engine and cost model
pub mod recommendation;

/// Ticket identifier generation
pub mod ticket;

/// Catalog object categories and collaborator traits
pub mod catalog;

/// Schema descriptor and object definition shapes
pub mod schema;

/// Form validation rules
pub mod validation;
