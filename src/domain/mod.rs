//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `tenant` - Acting identities and the company boundary
//! - `session` - Chat session lifecycle and handoff flag
//! - `message` - Append-only messages and read state
//! - `bot` - Per-company auto-reply options
//! - `conversation` - Error taxonomy for chat operations

pub mod bot;
pub mod conversation;
pub mod foundation;
pub mod message;
pub mod session;
pub mod tenant;
