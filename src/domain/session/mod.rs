//! Session domain module.
//!
//! Handles the chat session lifecycle: creation on first visitor contact,
//! closing by an operator, reopening on the next visitor message, and the
//! one-way handoff flag.

mod aggregate;

pub use aggregate::{ChatSession, MAX_VISITOR_FIELD_LENGTH};
