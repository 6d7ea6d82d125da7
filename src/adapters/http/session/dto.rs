//! HTTP DTOs for session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::application::handlers::session::SessionSummary;
use crate::domain::foundation::{SenderType, SessionStatus};
use crate::domain::message::Message;
use crate::domain::session::ChatSession;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Query parameters for listing sessions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListSessionsParams {
    /// Only sessions waiting for a human.
    #[serde(default)]
    pub handoff: bool,
}

/// Operator message posted over REST.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub attachment_ref: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Session view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub visitor_identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visitor_name: Option<String>,
    pub status: SessionStatus,
    pub handoff_requested: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff_requested_at: Option<String>,
    pub owner_id: i64,
    pub company_id: i64,
    pub created_at: String,
    pub last_active_at: String,
}

impl From<&ChatSession> for SessionResponse {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id().to_string(),
            visitor_identifier: session.visitor_identifier().to_string(),
            visitor_name: session.visitor_name().map(str::to_string),
            status: session.status(),
            handoff_requested: session.handoff_requested(),
            handoff_requested_at: session.handoff_requested_at().map(|t| t.to_rfc3339()),
            owner_id: session.owner_id().value(),
            company_id: session.company_id().value(),
            created_at: session.created_at().to_rfc3339(),
            last_active_at: session.last_active_at().to_rfc3339(),
        }
    }
}

/// Session list entry with its unread count.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummaryResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub unread_count: u64,
}

impl From<&SessionSummary> for SessionSummaryResponse {
    fn from(summary: &SessionSummary) -> Self {
        Self {
            session: (&summary.session).into(),
            unread_count: summary.unread_count,
        }
    }
}

/// Session list response.
#[derive(Debug, Clone, Serialize)]
pub struct SessionListResponse {
    pub items: Vec<SessionSummaryResponse>,
    pub total: usize,
}

impl From<Vec<SessionSummary>> for SessionListResponse {
    fn from(list: Vec<SessionSummary>) -> Self {
        let items: Vec<SessionSummaryResponse> = list.iter().map(Into::into).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Stored message for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: i64,
    pub session_id: String,
    pub sender_type: SenderType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<i64>,
    pub content: Option<String>,
    pub attachment_ref: Option<String>,
    pub created_at: String,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            session_id: message.session_id.to_string(),
            sender_type: message.sender_type,
            sender_id: message.sender_id.map(|id| id.value()),
            content: message.content.clone(),
            attachment_ref: message.attachment_ref.clone(),
            created_at: message.created_at.to_rfc3339(),
            is_read: message.is_read,
            read_at: message.read_at.as_ref().map(|t| t.to_rfc3339()),
        }
    }
}
