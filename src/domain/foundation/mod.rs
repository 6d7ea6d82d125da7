//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the live chat domain.

mod auth;
mod errors;
mod ids;
mod sender_type;
mod session_status;
mod state_machine;
mod timestamp;

pub use auth::{AuthError, AuthenticatedUser};
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AccessKeyId, BotOptionId, CompanyId, MessageId, OperatorId, SessionId};
pub use sender_type::{OperatorRole, SenderType};
pub use session_status::SessionStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
