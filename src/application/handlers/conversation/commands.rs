//! Commands and results of the conversation coordinator.

use crate::domain::foundation::{BotOptionId, SessionId};
use crate::domain::message::{Message, MessageBody};
use crate::domain::session::ChatSession;
use crate::domain::tenant::{AccessKeyGrant, OperatorIdentity};

/// Visitor text, attachment or bot option click.
///
/// Without a `session_id` the visitor's open session is found or created
/// from `visitor_identifier`.
#[derive(Debug, Clone)]
pub struct VisitorActionCommand {
    pub grant: AccessKeyGrant,
    pub session_id: Option<SessionId>,
    pub visitor_identifier: Option<String>,
    pub visitor_name: Option<String>,
    pub content: Option<String>,
    pub attachment_ref: Option<String>,
    pub bot_option_id: Option<BotOptionId>,
}

impl VisitorActionCommand {
    /// A plain text message into an existing session.
    pub fn text(grant: AccessKeyGrant, session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            grant,
            session_id: Some(session_id),
            visitor_identifier: None,
            visitor_name: None,
            content: Some(content.into()),
            attachment_ref: None,
            bot_option_id: None,
        }
    }
}

/// Visitor action whose message has been validated but not stored.
///
/// Nothing has been created, reopened or written yet; a rejected action
/// never gets this far.
#[derive(Debug, Clone)]
pub struct PreparedVisitorAction {
    pub(super) grant: AccessKeyGrant,
    pub(super) target: VisitorTarget,
    pub(super) visitor_name: Option<String>,
    pub(super) body: MessageBody,
    pub(super) bot_option_id: Option<BotOptionId>,
}

/// Where a prepared visitor message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisitorTarget {
    Session(SessionId),
    /// First contact: the visitor's open session, created if needed.
    FirstContact { visitor_identifier: String },
}

impl PreparedVisitorAction {
    pub fn grant(&self) -> &AccessKeyGrant {
        &self.grant
    }

    pub fn target(&self) -> &VisitorTarget {
        &self.target
    }

    pub fn visitor_name(&self) -> Option<&str> {
        self.visitor_name.as_deref()
    }

    pub fn body(&self) -> &MessageBody {
        &self.body
    }

    /// Points the action at a session resolved by the caller.
    pub fn into_session(mut self, session_id: SessionId) -> Self {
        self.target = VisitorTarget::Session(session_id);
        self
    }
}

/// Result of a visitor action.
#[derive(Debug, Clone)]
pub struct VisitorActionResult {
    pub session: ChatSession,
    pub visitor_message: Message,
    pub bot_reply: Option<Message>,
}

/// Operator reply into an existing session.
#[derive(Debug, Clone)]
pub struct OperatorActionCommand {
    pub identity: OperatorIdentity,
    pub session_id: SessionId,
    pub content: Option<String>,
    pub attachment_ref: Option<String>,
}
