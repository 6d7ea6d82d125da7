//! Chat session aggregate.
//!
//! A session is one conversation between a visitor and a company, owned by
//! one operator. Sessions are never deleted; they move between open and
//! closed, and the handoff flag only ever goes from unset to set.

use crate::domain::foundation::{
    CompanyId, DomainError, ErrorCode, OperatorId, SessionId, SessionStatus, StateMachine,
    Timestamp, ValidationError,
};
use crate::domain::tenant::{AccessKeyGrant, Actor, OperatorIdentity, SessionOwner};
use serde::{Deserialize, Serialize};

/// Maximum length for visitor identifiers and names.
pub const MAX_VISITOR_FIELD_LENGTH: usize = 255;

/// Chat session aggregate.
///
/// # Invariants
///
/// - `visitor_identifier` is non-empty and at most 255 characters
/// - company is always the owner's company (see [`SessionOwner`])
/// - `handoff_requested_at` is set exactly when `handoff_requested` is true
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    id: SessionId,
    visitor_identifier: String,
    visitor_name: Option<String>,
    status: SessionStatus,
    handoff_requested: bool,
    handoff_requested_at: Option<Timestamp>,
    owner: SessionOwner,
    created_at: Timestamp,
    last_active_at: Timestamp,
}

impl ChatSession {
    /// Opens a new session for a visitor.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the identifier is empty or a field is too long
    pub fn open(
        visitor_identifier: &str,
        visitor_name: Option<&str>,
        owner: SessionOwner,
    ) -> Result<Self, DomainError> {
        let visitor_identifier = Self::validate_identifier(visitor_identifier)?;
        let visitor_name = Self::normalize_name(visitor_name)?;

        let now = Timestamp::now();
        Ok(Self {
            id: SessionId::new(),
            visitor_identifier,
            visitor_name,
            status: SessionStatus::Open,
            handoff_requested: false,
            handoff_requested_at: None,
            owner,
            created_at: now,
            last_active_at: now,
        })
    }

    /// Reconstitute a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        visitor_identifier: String,
        visitor_name: Option<String>,
        status: SessionStatus,
        handoff_requested_at: Option<Timestamp>,
        owner: SessionOwner,
        created_at: Timestamp,
        last_active_at: Timestamp,
    ) -> Self {
        Self {
            id,
            visitor_identifier,
            visitor_name,
            status,
            handoff_requested: handoff_requested_at.is_some(),
            handoff_requested_at,
            owner,
            created_at,
            last_active_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn visitor_identifier(&self) -> &str {
        &self.visitor_identifier
    }

    pub fn visitor_name(&self) -> Option<&str> {
        self.visitor_name.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn handoff_requested(&self) -> bool {
        self.handoff_requested
    }

    pub fn handoff_requested_at(&self) -> Option<&Timestamp> {
        self.handoff_requested_at.as_ref()
    }

    pub fn owner(&self) -> &SessionOwner {
        &self.owner
    }

    pub fn owner_id(&self) -> OperatorId {
        self.owner.operator_id
    }

    pub fn company_id(&self) -> CompanyId {
        self.owner.company_id
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn last_active_at(&self) -> &Timestamp {
        &self.last_active_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Checks that an actor may see this session at all.
    ///
    /// Sessions of another company are reported as not found so their
    /// existence is never revealed.
    pub fn ensure_visible_to(&self, actor: &Actor) -> Result<(), DomainError> {
        match actor {
            Actor::Operator(identity) => self.ensure_operator_access(identity),
            Actor::Visitor(grant) => self.ensure_access_key(grant),
        }
    }

    /// Operators act on sessions they own; admins on every session of their company.
    pub fn ensure_operator_access(&self, identity: &OperatorIdentity) -> Result<(), DomainError> {
        if identity.company_id != self.owner.company_id {
            return Err(self.not_found());
        }
        if identity.operator_id != self.owner.operator_id && !identity.is_admin() {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the owning operator or an admin may act on this session",
            ));
        }
        Ok(())
    }

    /// Visitors may act on any session of the company their key belongs to.
    pub fn ensure_access_key(&self, grant: &AccessKeyGrant) -> Result<(), DomainError> {
        if grant.company_id != self.owner.company_id {
            return Err(self.not_found());
        }
        Ok(())
    }

    fn not_found(&self) -> DomainError {
        DomainError::new(
            ErrorCode::SessionNotFound,
            format!("Session not found: {}", self.id),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Closes an open session. Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        self.transition(SessionStatus::Closed)
    }

    /// Reopens a closed session and marks it active. Returns false if it was
    /// already open (activity is recorded either way).
    pub fn reopen(&mut self, now: Timestamp) -> bool {
        self.touch(now);
        self.transition(SessionStatus::Open)
    }

    /// Records activity. `last_active_at` never moves backwards.
    pub fn touch(&mut self, now: Timestamp) {
        if now.is_after(&self.last_active_at) {
            self.last_active_at = now;
        }
    }

    /// Sets the handoff flag. Returns false if it was already set, in which
    /// case the original timestamp is kept.
    pub fn request_handoff(&mut self, now: Timestamp) -> bool {
        if self.handoff_requested {
            return false;
        }
        self.handoff_requested = true;
        self.handoff_requested_at = Some(now);
        true
    }

    /// Fills in the visitor's display name if none is recorded yet.
    pub fn record_visitor_name(&mut self, name: Option<&str>) -> bool {
        if self.visitor_name.is_some() {
            return false;
        }
        match Self::normalize_name(name) {
            Ok(Some(name)) => {
                self.visitor_name = Some(name);
                true
            }
            _ => false,
        }
    }

    fn transition(&mut self, target: SessionStatus) -> bool {
        match self.status.transition_to(target) {
            Ok(next) => {
                self.status = next;
                true
            }
            Err(_) => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    fn validate_identifier(identifier: &str) -> Result<String, ValidationError> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("visitor_identifier"));
        }
        let len = trimmed.chars().count();
        if len > MAX_VISITOR_FIELD_LENGTH {
            return Err(ValidationError::too_long(
                "visitor_identifier",
                MAX_VISITOR_FIELD_LENGTH,
                len,
            ));
        }
        Ok(trimmed.to_string())
    }

    fn normalize_name(name: Option<&str>) -> Result<Option<String>, ValidationError> {
        let Some(trimmed) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };
        let len = trimmed.chars().count();
        if len > MAX_VISITOR_FIELD_LENGTH {
            return Err(ValidationError::too_long(
                "visitor_name",
                MAX_VISITOR_FIELD_LENGTH,
                len,
            ));
        }
        Ok(Some(trimmed.to_string()))
    }
}
