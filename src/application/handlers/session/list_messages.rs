//! ListMessagesHandler - an operator reads a session's history.

use std::sync::Arc;

use crate::domain::conversation::ChatError;
use crate::domain::foundation::{SessionId, Timestamp};
use crate::domain::message::Message;
use crate::domain::tenant::OperatorIdentity;
use crate::ports::{MessageLog, SessionRegistry};

/// Query for a session's messages. Reading marks visitor messages read.
#[derive(Debug, Clone)]
pub struct ListMessagesQuery {
    pub identity: OperatorIdentity,
    pub session_id: SessionId,
}

pub struct ListMessagesHandler {
    sessions: Arc<dyn SessionRegistry>,
    messages: Arc<dyn MessageLog>,
}

impl ListMessagesHandler {
    pub fn new(sessions: Arc<dyn SessionRegistry>, messages: Arc<dyn MessageLog>) -> Self {
        Self { sessions, messages }
    }

    /// Messages in ascending order, with visitor messages marked read.
    pub async fn handle(&self, query: ListMessagesQuery) -> Result<Vec<Message>, ChatError> {
        let session = self.sessions.get(&query.session_id).await?;
        session.ensure_operator_access(&query.identity)?;

        let marked = self
            .messages
            .mark_visitor_messages_read(&query.session_id, Timestamp::now())
            .await?;
        if marked > 0 {
            tracing::debug!(session_id = %query.session_id, marked, "Marked visitor messages read");
        }

        Ok(self.messages.list_by_session(&query.session_id).await?)
    }
}
