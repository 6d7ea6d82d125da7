//! WebSocket message types for the live chat protocol.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, new messages, pongs
//! - Client → Server: joining a session, visitor and operator messages, pings
//!
//! Frames are JSON objects tagged by `type`. Field names are camelCase.
//! Frames that fail to parse or to apply are dropped and logged; no error
//! frame is sent back.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BotOptionId, SenderType, SessionId, Timestamp};
use crate::domain::message::Message;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established successfully.
    Connected(ConnectedMessage),

    /// A message was stored in a session the client watches.
    NewMessage(NewMessageEvent),

    /// Heartbeat response.
    Pong(PongMessage),
}

impl ServerMessage {
    pub fn pong() -> Self {
        ServerMessage::Pong(PongMessage {
            timestamp: Timestamp::now().to_rfc3339(),
        })
    }
}

/// Sent once the upgrade is authenticated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub connection_id: String,
    pub company_id: i64,
}

/// A stored message as seen by clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageEvent {
    pub id: i64,
    pub session_id: String,
    pub sender_type: SenderType,
    pub content: Option<String>,
    pub attachment_ref: Option<String>,
    pub created_at: String,
}

impl From<&Message> for NewMessageEvent {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.value(),
            session_id: message.session_id.to_string(),
            sender_type: message.sender_type,
            content: message.content.clone(),
            attachment_ref: message.attachment_ref.clone(),
            created_at: message.created_at.to_rfc3339(),
        }
    }
}

/// Heartbeat response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start receiving a session's messages.
    JoinSession(JoinSessionFrame),

    /// Visitor text, attachment or bot option click.
    VisitorMessage(VisitorMessageFrame),

    /// Operator reply.
    OperatorMessage(OperatorMessageFrame),

    /// Heartbeat request.
    Ping,
}

/// Which side of the conversation a connection speaks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Visitor,
    Operator,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinSessionFrame {
    pub session_id: SessionId,
    pub role: ParticipantRole,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorMessageFrame {
    pub session_id: Option<SessionId>,
    pub visitor_identifier: Option<String>,
    pub visitor_name: Option<String>,
    pub content: Option<String>,
    pub attachment_ref: Option<String>,
    pub bot_option_id: Option<BotOptionId>,
}

impl VisitorMessageFrame {
    /// True if the frame carries something to store.
    pub fn has_payload(&self) -> bool {
        has_text(self.content.as_deref())
            || has_text(self.attachment_ref.as_deref())
            || self.bot_option_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorMessageFrame {
    pub session_id: SessionId,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub attachment_ref: Option<String>,
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{MessageId, OperatorId};

    #[test]
    fn new_message_serializes_with_lowercase_sender_type() {
        let message = Message {
            id: MessageId::new(7),
            session_id: SessionId::new(),
            sender_type: SenderType::Operator,
            sender_id: Some(OperatorId::new(3)),
            content: Some("Hello".to_string()),
            attachment_ref: None,
            created_at: Timestamp::now(),
            is_read: true,
            read_at: None,
        };

        let json = serde_json::to_value(ServerMessage::NewMessage((&message).into())).unwrap();

        assert_eq!(json["type"], "new_message");
        assert_eq!(json["id"], 7);
        assert_eq!(json["senderType"], "operator");
        assert_eq!(json["sessionId"], message.session_id.to_string());
        assert!(json["attachmentRef"].is_null());
    }

    #[test]
    fn connected_message_uses_camel_case() {
        let msg = ServerMessage::Connected(ConnectedMessage {
            connection_id: "abc".to_string(),
            company_id: 4,
        });
        let json = serde_json::to_value(msg).unwrap();
        assert_eq!(json["type"], "connected");
        assert_eq!(json["connectionId"], "abc");
        assert_eq!(json["companyId"], 4);
    }

    #[test]
    fn parses_ping() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
    }

    #[test]
    fn parses_join_session() {
        let id = SessionId::new();
        let raw = format!(r#"{{"type":"join_session","sessionId":"{}","role":"operator"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinSession(JoinSessionFrame {
                session_id: id,
                role: ParticipantRole::Operator,
            })
        );
    }

    #[test]
    fn visitor_message_fields_are_optional() {
        let raw = r#"{"type":"visitor_message","visitorIdentifier":"v-1","botOptionId":5}"#;
        let msg: ClientMessage = serde_json::from_str(raw).unwrap();
        let ClientMessage::VisitorMessage(frame) = msg else {
            panic!("expected visitor message");
        };
        assert_eq!(frame.visitor_identifier.as_deref(), Some("v-1"));
        assert_eq!(frame.bot_option_id, Some(BotOptionId::new(5)));
        assert!(frame.session_id.is_none());
        assert!(frame.has_payload());
    }

    #[test]
    fn blank_visitor_message_has_no_payload() {
        let frame = VisitorMessageFrame {
            content: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(!frame.has_payload());
    }

    #[test]
    fn malformed_session_id_is_rejected() {
        let raw = r#"{"type":"operator_message","sessionId":"nope","content":"hi"}"#;
        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());
    }
}
