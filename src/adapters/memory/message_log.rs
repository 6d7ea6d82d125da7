//! In-memory message log.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, MessageId, SessionId, Timestamp};
use crate::domain::message::{Message, NewMessage};
use crate::ports::MessageLog;

#[derive(Debug, Default)]
struct LogState {
    messages: Vec<Message>,
    next_id: i64,
}

/// In-memory append-only message storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessageLog {
    state: Arc<RwLock<LogState>>,
}

impl InMemoryMessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored messages (useful for tests).
    pub async fn message_count(&self) -> usize {
        self.state.read().await.messages.len()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = MessageId::new(state.next_id);

        // Clock steps backwards must not reorder the log.
        let mut created_at = Timestamp::now();
        if let Some(last) = state.messages.last() {
            if last.created_at.is_after(&created_at) {
                created_at = last.created_at;
            }
        }

        let stored = message.into_stored(id, created_at);
        state.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| &m.session_id == session_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn mark_visitor_messages_read(
        &self,
        session_id: &SessionId,
        read_at: Timestamp,
    ) -> Result<u64, DomainError> {
        let mut state = self.state.write().await;
        let mut marked = 0;
        for message in state
            .messages
            .iter_mut()
            .filter(|m| &m.session_id == session_id && m.is_unread_visitor_message())
        {
            message.is_read = true;
            message.read_at = Some(read_at);
            marked += 1;
        }
        Ok(marked)
    }

    async fn unread_counts(
        &self,
        session_ids: &[SessionId],
    ) -> Result<HashMap<SessionId, u64>, DomainError> {
        let mut counts: HashMap<SessionId, u64> =
            session_ids.iter().map(|id| (*id, 0)).collect();

        let state = self.state.read().await;
        for message in state.messages.iter().filter(|m| m.is_unread_visitor_message()) {
            if let Some(count) = counts.get_mut(&message.session_id) {
                *count += 1;
            }
        }
        Ok(counts)
    }
}
