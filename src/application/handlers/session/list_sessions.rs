//! ListSessionsHandler - Query handler for an operator's session list.

use std::sync::Arc;

use crate::domain::conversation::ChatError;
use crate::domain::foundation::SessionId;
use crate::domain::session::ChatSession;
use crate::domain::tenant::OperatorIdentity;
use crate::ports::{MessageLog, SessionListFilter, SessionRegistry};

/// Query to list the sessions an operator may see.
#[derive(Debug, Clone)]
pub struct ListSessionsQuery {
    pub identity: OperatorIdentity,
    /// Only sessions waiting for a human.
    pub handoff_only: bool,
}

/// A session with its number of unread visitor messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session: ChatSession,
    pub unread_count: u64,
}

/// Handler for listing sessions, most recently active first.
pub struct ListSessionsHandler {
    sessions: Arc<dyn SessionRegistry>,
    messages: Arc<dyn MessageLog>,
}

impl ListSessionsHandler {
    pub fn new(sessions: Arc<dyn SessionRegistry>, messages: Arc<dyn MessageLog>) -> Self {
        Self { sessions, messages }
    }

    pub async fn handle(&self, query: ListSessionsQuery) -> Result<Vec<SessionSummary>, ChatError> {
        let filter = SessionListFilter::visible_to(&query.identity, query.handoff_only);
        let sessions = self.sessions.list(&filter).await?;

        let ids: Vec<SessionId> = sessions.iter().map(|s| *s.id()).collect();
        let unread = self.messages.unread_counts(&ids).await?;

        Ok(sessions
            .into_iter()
            .map(|session| {
                let unread_count = unread.get(session.id()).copied().unwrap_or(0);
                SessionSummary {
                    session,
                    unread_count,
                }
            })
            .collect())
    }
}
