//! Error taxonomy for chat operations.

use crate::domain::foundation::{DomainError, ErrorCode, ValidationError};

/// Errors surfaced by chat operations.
///
/// Anything living in another tenant is reported as `NotFound`, never
/// `Forbidden`, so callers cannot probe for foreign sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// Missing, or belongs to another company.
    NotFound(String),
    /// Authenticated but not allowed (e.g. not the owning operator).
    Forbidden(String),
    /// Malformed identifier or empty message.
    InvalidArgument { field: String, message: String },
    /// Lost a uniqueness race. Resolved internally by retrying.
    Conflict(String),
    /// Access key is no longer active.
    Revoked,
    /// Infrastructure error.
    Infrastructure(String),
}

impl ChatError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ChatError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ChatError::Forbidden(message.into())
    }

    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        ChatError::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        ChatError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::NotFound(_) => ErrorCode::SessionNotFound,
            ChatError::Forbidden(_) => ErrorCode::Forbidden,
            ChatError::InvalidArgument { .. } => ErrorCode::ValidationFailed,
            ChatError::Conflict(_) => ErrorCode::Conflict,
            ChatError::Revoked => ErrorCode::AccessKeyRevoked,
            ChatError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ChatError::NotFound(msg) => msg.clone(),
            ChatError::Forbidden(msg) => msg.clone(),
            ChatError::InvalidArgument { field, message } => {
                format!("Invalid '{}': {}", field, message)
            }
            ChatError::Conflict(msg) => format!("Conflict: {}", msg),
            ChatError::Revoked => "Access key has been revoked".to_string(),
            ChatError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ChatError {}

impl From<DomainError> for ChatError {
    fn from(err: DomainError) -> Self {
        match err.code {
            code if code.is_not_found() => ChatError::NotFound(err.message),
            ErrorCode::Forbidden | ErrorCode::Unauthorized => ChatError::Forbidden(err.message),
            ErrorCode::ValidationFailed | ErrorCode::InvalidStateTransition => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "request".to_string());
                ChatError::InvalidArgument {
                    field,
                    message: err.message,
                }
            }
            ErrorCode::Conflict => ChatError::Conflict(err.message),
            ErrorCode::AccessKeyRevoked => ChatError::Revoked,
            _ => ChatError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for ChatError {
    fn from(err: ValidationError) -> Self {
        ChatError::InvalidArgument {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes_map_to_not_found() {
        let err: ChatError = DomainError::new(ErrorCode::BotOptionNotFound, "gone").into();
        assert_eq!(err, ChatError::NotFound("gone".to_string()));
    }

    #[test]
    fn validation_keeps_field_name() {
        let err: ChatError = DomainError::validation("content", "empty").into();
        assert_eq!(err, ChatError::invalid_argument("content", "empty"));
    }

    #[test]
    fn revoked_key_maps_to_revoked() {
        let err: ChatError = DomainError::new(ErrorCode::AccessKeyRevoked, "revoked").into();
        assert_eq!(err, ChatError::Revoked);
        assert_eq!(err.code(), ErrorCode::AccessKeyRevoked);
    }

    #[test]
    fn database_errors_become_infrastructure() {
        let err: ChatError = DomainError::new(ErrorCode::DatabaseError, "boom").into();
        assert!(matches!(err, ChatError::Infrastructure(_)));
    }

    #[test]
    fn validation_error_converts_directly() {
        let err: ChatError = ValidationError::empty_field("visitor_identifier").into();
        assert!(matches!(
            err,
            ChatError::InvalidArgument { ref field, .. } if field == "visitor_identifier"
        ));
    }
}
