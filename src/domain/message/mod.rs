//! Message domain module.
//!
//! Messages are append-only. The only mutable part of a stored message is
//! its read state, and only visitor messages ever start out unread.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    MessageId, OperatorId, SenderType, SessionId, Timestamp, ValidationError,
};

/// Maximum length of an attachment reference.
pub const MAX_ATTACHMENT_REF_LENGTH: usize = 1024;

/// Who wrote a message, carrying the operator id where there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageAuthor {
    Visitor,
    Operator(OperatorId),
    System,
}

impl MessageAuthor {
    pub fn sender_type(&self) -> SenderType {
        match self {
            MessageAuthor::Visitor => SenderType::Visitor,
            MessageAuthor::Operator(_) => SenderType::Operator,
            MessageAuthor::System => SenderType::System,
        }
    }

    pub fn sender_id(&self) -> Option<OperatorId> {
        match self {
            MessageAuthor::Operator(id) => Some(*id),
            _ => None,
        }
    }
}

/// Validated content and attachment of a message, not yet tied to a session.
///
/// Building the body first lets callers reject an empty message before any
/// session is created or reopened for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBody {
    content: Option<String>,
    attachment_ref: Option<String>,
}

impl MessageBody {
    /// Validates message input.
    ///
    /// Content is kept exactly as sent; blank content counts as absent.
    /// Attachment references are trimmed.
    ///
    /// # Errors
    ///
    /// - `EmptyField("content")` if neither content nor attachment remains
    /// - `TooLong("attachment_ref")` for oversized attachment references
    pub fn new(content: Option<&str>, attachment_ref: Option<&str>) -> Result<Self, ValidationError> {
        let content = content
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string);
        let attachment_ref = attachment_ref
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if content.is_none() && attachment_ref.is_none() {
            return Err(ValidationError::empty_field("content"));
        }
        if let Some(attachment) = &attachment_ref {
            let len = attachment.chars().count();
            if len > MAX_ATTACHMENT_REF_LENGTH {
                return Err(ValidationError::too_long(
                    "attachment_ref",
                    MAX_ATTACHMENT_REF_LENGTH,
                    len,
                ));
            }
        }

        Ok(Self {
            content,
            attachment_ref,
        })
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn attachment_ref(&self) -> Option<&str> {
        self.attachment_ref.as_deref()
    }
}

/// A validated message that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    session_id: SessionId,
    author: MessageAuthor,
    content: Option<String>,
    attachment_ref: Option<String>,
}

impl NewMessage {
    /// Validates message input, see [`MessageBody::new`].
    pub fn new(
        session_id: SessionId,
        author: MessageAuthor,
        content: Option<&str>,
        attachment_ref: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let body = MessageBody::new(content, attachment_ref)?;
        Ok(Self::from_body(session_id, author, body))
    }

    /// Message for an already validated body.
    pub fn from_body(session_id: SessionId, author: MessageAuthor, body: MessageBody) -> Self {
        Self {
            session_id,
            author,
            content: body.content,
            attachment_ref: body.attachment_ref,
        }
    }

    /// System message with fixed text.
    pub fn system(session_id: SessionId, text: impl Into<String>) -> Self {
        Self {
            session_id,
            author: MessageAuthor::System,
            content: Some(text.into()),
            attachment_ref: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn author(&self) -> MessageAuthor {
        self.author
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn attachment_ref(&self) -> Option<&str> {
        self.attachment_ref.as_deref()
    }

    /// Operator and system messages are stored already read.
    pub fn stored_as_read(&self) -> bool {
        !matches!(self.author, MessageAuthor::Visitor)
    }

    /// Builds the stored record once storage has assigned an id.
    pub fn into_stored(self, id: MessageId, created_at: Timestamp) -> Message {
        let is_read = self.stored_as_read();
        Message {
            id,
            session_id: self.session_id,
            sender_type: self.author.sender_type(),
            sender_id: self.author.sender_id(),
            content: self.content,
            attachment_ref: self.attachment_ref,
            created_at,
            is_read,
            read_at: if is_read { Some(created_at) } else { None },
        }
    }
}

/// Stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub session_id: SessionId,
    pub sender_type: SenderType,
    pub sender_id: Option<OperatorId>,
    pub content: Option<String>,
    pub attachment_ref: Option<String>,
    pub created_at: Timestamp,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
}

impl Message {
    /// Unread visitor message, the only kind counted as unread.
    pub fn is_unread_visitor_message(&self) -> bool {
        self.sender_type == SenderType::Visitor && !self.is_read
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionId {
        SessionId::new()
    }

    #[test]
    fn rejects_message_without_content_or_attachment() {
        let err = NewMessage::new(session(), MessageAuthor::Visitor, Some("   "), None).unwrap_err();
        assert_eq!(err, ValidationError::empty_field("content"));
    }

    #[test]
    fn attachment_alone_is_enough() {
        let msg =
            NewMessage::new(session(), MessageAuthor::Visitor, None, Some("uploads/a.png")).unwrap();
        assert_eq!(msg.content(), None);
        assert_eq!(msg.attachment_ref(), Some("uploads/a.png"));
    }

    #[test]
    fn content_is_stored_as_sent() {
        let indented = "    fn main() {}\n";
        let msg = NewMessage::new(session(), MessageAuthor::Visitor, Some(indented), None).unwrap();
        assert_eq!(msg.content(), Some(indented));
    }

    #[test]
    fn attachment_ref_is_trimmed() {
        let body = MessageBody::new(Some(" \n "), Some(" uploads/a.png ")).unwrap();
        assert_eq!(body.content(), None);
        assert_eq!(body.attachment_ref(), Some("uploads/a.png"));
    }

    #[test]
    fn rejects_oversized_attachment_ref() {
        let long = "a".repeat(MAX_ATTACHMENT_REF_LENGTH + 1);
        assert!(NewMessage::new(session(), MessageAuthor::Visitor, None, Some(&long)).is_err());
    }

    #[test]
    fn visitor_messages_are_stored_unread() {
        let stored = NewMessage::new(session(), MessageAuthor::Visitor, Some("hi"), None)
            .unwrap()
            .into_stored(MessageId::new(1), Timestamp::now());
        assert!(!stored.is_read);
        assert!(stored.read_at.is_none());
        assert!(stored.is_unread_visitor_message());
        assert_eq!(stored.sender_id, None);
    }

    #[test]
    fn operator_messages_are_stored_read_with_sender() {
        let now = Timestamp::now();
        let stored = NewMessage::new(
            session(),
            MessageAuthor::Operator(OperatorId::new(3)),
            Some("hello"),
            None,
        )
        .unwrap()
        .into_stored(MessageId::new(2), now);
        assert!(stored.is_read);
        assert_eq!(stored.read_at, Some(now));
        assert_eq!(stored.sender_type, SenderType::Operator);
        assert_eq!(stored.sender_id, Some(OperatorId::new(3)));
    }

    #[test]
    fn system_messages_are_stored_read() {
        let stored = NewMessage::system(session(), "An operator will join shortly.")
            .into_stored(MessageId::new(3), Timestamp::now());
        assert!(stored.is_read);
        assert_eq!(stored.sender_type, SenderType::System);
    }
}
