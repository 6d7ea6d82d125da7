//! Conversation handlers: the coordinator for visitor and operator sends.

mod commands;
mod coordinator;

pub use commands::{
    OperatorActionCommand, PreparedVisitorAction, VisitorActionCommand, VisitorActionResult,
    VisitorTarget,
};
pub use coordinator::{ConversationCoordinator, CoordinatorOptions};
