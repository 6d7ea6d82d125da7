//! Message log port.
//!
//! Durable, append-only store of chat messages. Owns read/unread
//! bookkeeping; nothing else about a stored message ever changes.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SessionId, Timestamp};
use crate::domain::message::{Message, NewMessage};

/// Append-only message storage.
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Persist a message and return the stored record.
    ///
    /// Visitor messages are stored unread; operator and system messages
    /// are stored read.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (not retried)
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError>;

    /// All messages of a session ordered by `created_at`, then id.
    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError>;

    /// Marks every unread visitor message of the session read.
    ///
    /// Returns the number of messages marked; a second call returns 0.
    async fn mark_visitor_messages_read(
        &self,
        session_id: &SessionId,
        read_at: Timestamp,
    ) -> Result<u64, DomainError>;

    /// Unread visitor message counts for the given sessions.
    ///
    /// Every requested session is present in the result, with 0 where
    /// nothing is unread.
    async fn unread_counts(
        &self,
        session_ids: &[SessionId],
    ) -> Result<HashMap<SessionId, u64>, DomainError>;
}
