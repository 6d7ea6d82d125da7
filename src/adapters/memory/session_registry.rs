//! In-memory session registry.
//!
//! Every primitive takes the write lock once, so each is atomic in the same
//! way a single SQL statement is. `ensure_open_session` composes several of
//! them, which is what makes its conflict-retry path reachable here too.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, SessionId, Timestamp};
use crate::domain::session::ChatSession;
use crate::domain::tenant::SessionOwner;
use crate::ports::{SessionListFilter, SessionRegistry};

/// In-memory session storage.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, ChatSession>>>,
}

impl InMemorySessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions (useful for tests).
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Number of open sessions for a pair (useful for tests).
    pub async fn open_count(&self, visitor_identifier: &str, owner: &SessionOwner) -> usize {
        self.sessions
            .read()
            .await
            .values()
            .filter(|s| is_open_for(s, visitor_identifier, owner))
            .count()
    }
}

fn is_open_for(session: &ChatSession, visitor_identifier: &str, owner: &SessionOwner) -> bool {
    session.is_open()
        && session.visitor_identifier() == visitor_identifier
        && session.owner() == owner
}

fn not_found(id: &SessionId) -> DomainError {
    DomainError::new(
        ErrorCode::SessionNotFound,
        format!("Session not found: {}", id),
    )
}

#[async_trait]
impl SessionRegistry for InMemorySessionRegistry {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<ChatSession>, DomainError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn find_open(
        &self,
        visitor_identifier: &str,
        owner: &SessionOwner,
    ) -> Result<Option<ChatSession>, DomainError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| is_open_for(s, visitor_identifier, owner))
            .max_by_key(|s| *s.last_active_at())
            .cloned())
    }

    async fn insert_open(&self, session: &ChatSession) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        if sessions
            .values()
            .any(|s| is_open_for(s, session.visitor_identifier(), session.owner()))
        {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "An open session already exists for this visitor and owner",
            ));
        }
        sessions.insert(*session.id(), session.clone());
        Ok(())
    }

    async fn fill_visitor_name(&self, id: &SessionId, name: &str) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        session.record_visitor_name(Some(name));
        Ok(())
    }

    async fn touch(&self, id: &SessionId, at: Timestamp) -> Result<(), DomainError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        session.touch(at);
        Ok(())
    }

    async fn reopen_if_closed(&self, id: &SessionId, at: Timestamp) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        let (visitor_identifier, owner, is_open) = {
            let session = sessions.get(id).ok_or_else(|| not_found(id))?;
            (
                session.visitor_identifier().to_string(),
                *session.owner(),
                session.is_open(),
            )
        };

        if !is_open
            && sessions
                .values()
                .any(|s| s.id() != id && is_open_for(s, &visitor_identifier, &owner))
        {
            return Err(DomainError::new(
                ErrorCode::Conflict,
                "Another open session exists for this visitor and owner",
            ));
        }

        let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        Ok(session.reopen(at))
    }

    async fn mark_closed(&self, id: &SessionId) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        Ok(session.close())
    }

    async fn mark_handoff_requested(
        &self,
        id: &SessionId,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        Ok(session.request_handoff(at))
    }

    async fn list(&self, filter: &SessionListFilter) -> Result<Vec<ChatSession>, DomainError> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<ChatSession> = sessions
            .values()
            .filter(|s| s.company_id() == filter.company_id)
            .filter(|s| filter.owner.map_or(true, |owner| s.owner_id() == owner))
            .filter(|s| !filter.handoff_only || s.handoff_requested())
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            b.last_active_at()
                .cmp(a.last_active_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        Ok(matching)
    }
}
