//! Session registry port.
//!
//! Session existence, reuse, open/closed transitions and the handoff flag.
//! Implementations supply single-statement primitives; the provided methods
//! compose them into the operations callers use.
//!
//! # Concurrency
//!
//! At most one open session may exist per (visitor identifier, owner).
//! `insert_open` and `reopen_if_closed` must enforce that atomically and
//! report `Conflict` when they would break it, so concurrent first contact
//! converges on a single session via [`SessionRegistry::ensure_open_session`].

use async_trait::async_trait;

use crate::domain::foundation::{
    CompanyId, DomainError, ErrorCode, OperatorId, SessionId, Timestamp,
};
use crate::domain::session::ChatSession;
use crate::domain::tenant::{Actor, OperatorIdentity, SessionOwner};

/// Lookups and inserts `ensure_open_session` attempts before giving up.
pub const ENSURE_OPEN_SESSION_ATTEMPTS: usize = 3;

/// Which sessions a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionListFilter {
    pub company_id: CompanyId,
    /// Restrict to one owner; `None` lists the whole company.
    pub owner: Option<OperatorId>,
    pub handoff_only: bool,
}

impl SessionListFilter {
    /// Sessions an operator may see: their own, or the whole company for admins.
    pub fn visible_to(identity: &OperatorIdentity, handoff_only: bool) -> Self {
        Self {
            company_id: identity.company_id,
            owner: if identity.is_admin() {
                None
            } else {
                Some(identity.operator_id)
            },
            handoff_only,
        }
    }
}

/// Session storage with lifecycle operations.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Find a session by id. Returns `None` if not found.
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<ChatSession>, DomainError>;

    /// Most recently active open session for the pair, if any.
    async fn find_open(
        &self,
        visitor_identifier: &str,
        owner: &SessionOwner,
    ) -> Result<Option<ChatSession>, DomainError>;

    /// Insert a new open session.
    ///
    /// # Errors
    ///
    /// - `Conflict` if an open session already exists for the pair
    async fn insert_open(&self, session: &ChatSession) -> Result<(), DomainError>;

    /// Record a visitor name on a session that has none. No-op otherwise.
    async fn fill_visitor_name(&self, id: &SessionId, name: &str) -> Result<(), DomainError>;

    /// Advance `last_active_at`.
    async fn touch(&self, id: &SessionId, at: Timestamp) -> Result<(), DomainError>;

    /// CLOSED -> OPEN, also touching. Returns true if the status changed.
    ///
    /// # Errors
    ///
    /// - `Conflict` if another open session exists for the same pair
    async fn reopen_if_closed(&self, id: &SessionId, at: Timestamp) -> Result<bool, DomainError>;

    /// OPEN -> CLOSED. Returns true if the status changed.
    async fn mark_closed(&self, id: &SessionId) -> Result<bool, DomainError>;

    /// Set the handoff flag unless already set. Returns true if it changed.
    async fn mark_handoff_requested(
        &self,
        id: &SessionId,
        at: Timestamp,
    ) -> Result<bool, DomainError>;

    /// Sessions matching the filter, most recently active first.
    async fn list(&self, filter: &SessionListFilter) -> Result<Vec<ChatSession>, DomainError>;

    /// Open session for the pair, creating one if needed.
    ///
    /// A `Conflict` from a concurrent creator is resolved by looking the
    /// winner up again. An existing session without a visitor name gets the
    /// supplied one.
    async fn ensure_open_session(
        &self,
        visitor_identifier: &str,
        visitor_name: Option<&str>,
        owner: &SessionOwner,
    ) -> Result<ChatSession, DomainError> {
        let candidate = ChatSession::open(visitor_identifier, visitor_name, *owner)?;

        for _ in 0..ENSURE_OPEN_SESSION_ATTEMPTS {
            if let Some(mut existing) = self
                .find_open(candidate.visitor_identifier(), owner)
                .await?
            {
                if existing.record_visitor_name(visitor_name) {
                    if let Some(name) = existing.visitor_name() {
                        self.fill_visitor_name(existing.id(), name).await?;
                    }
                }
                return Ok(existing);
            }

            match self.insert_open(&candidate).await {
                Ok(()) => {
                    tracing::info!(
                        session_id = %candidate.id(),
                        company_id = %owner.company_id,
                        "Opened chat session"
                    );
                    return Ok(candidate);
                }
                Err(err) if err.code == ErrorCode::Conflict => {
                    tracing::debug!("Lost open-session race, looking up the winner");
                }
                Err(err) => return Err(err),
            }
        }

        Err(DomainError::new(
            ErrorCode::Conflict,
            "Could not settle on an open session",
        ))
    }

    /// Load a session or fail with `SessionNotFound`.
    async fn get(&self, id: &SessionId) -> Result<ChatSession, DomainError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::SessionNotFound,
                format!("Session not found: {}", id),
            )
        })
    }

    /// Close a session on behalf of an operator.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if missing or in another company
    /// - `Forbidden` if the operator is neither owner nor admin
    async fn close(
        &self,
        id: &SessionId,
        actor: &OperatorIdentity,
    ) -> Result<ChatSession, DomainError> {
        let mut session = self.get(id).await?;
        session.ensure_operator_access(actor)?;
        if self.mark_closed(id).await? {
            tracing::info!(session_id = %id, operator_id = %actor.operator_id, "Closed chat session");
        }
        session.close();
        Ok(session)
    }

    /// Flag a session for human takeover. Idempotent.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if missing
    /// - `Forbidden` if the actor belongs to another company, or is an
    ///   operator who is neither owner nor admin
    async fn request_handoff(
        &self,
        id: &SessionId,
        actor: &Actor,
    ) -> Result<ChatSession, DomainError> {
        let session = self.get(id).await?;
        if actor.company_id() != session.company_id() {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Handoff requested from another company",
            ));
        }
        if let Actor::Operator(identity) = actor {
            session.ensure_operator_access(identity)?;
        }

        let now = Timestamp::now();
        if self.mark_handoff_requested(id, now).await? {
            tracing::info!(session_id = %id, "Handoff requested");
        }
        self.get(id).await
    }
}
