//! Conversation domain module - errors shared by every chat operation.

mod errors;

pub use errors::ChatError;
