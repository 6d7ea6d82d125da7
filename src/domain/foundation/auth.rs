//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is what a validated bearer credential proves: the
//! operator's identifier and nothing else. Company and role are resolved
//! afterwards through the tenant directory, so a token never carries tenant
//! data that could go stale.

use super::OperatorId;
use thiserror::Error;

/// Operator proven by a validated bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub operator_id: OperatorId,
}

impl AuthenticatedUser {
    pub fn new(operator_id: OperatorId) -> Self {
        Self { operator_id }
    }
}

/// Authentication errors that can occur during credential validation.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The token is missing, malformed, or has an invalid signature.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Auth service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AuthError {
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable(message.into())
    }
}
