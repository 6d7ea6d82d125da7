//! Mock session validator for tests and local development.
//!
//! # Example
//!
//! ```ignore
//! use live_chat::adapters::auth::MockSessionValidator;
//! use live_chat::domain::foundation::OperatorId;
//!
//! let validator = MockSessionValidator::new().with_operator("valid-token", OperatorId::new(1));
//! let user = validator.validate("valid-token").await?;
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, AuthenticatedUser, OperatorId};
use crate::ports::SessionValidator;

/// Mock session validator.
///
/// Stores a map of tokens to operators. Tokens not in the map return `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, AuthenticatedUser>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to an operator.
    pub fn with_operator(self, token: impl Into<String>, operator_id: OperatorId) -> Self {
        self.add_token(token, operator_id);
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        if let Ok(mut forced) = self.force_error.write() {
            *forced = Some(error);
        }
        self
    }

    /// Registers a new valid token at runtime.
    pub fn add_token(&self, token: impl Into<String>, operator_id: OperatorId) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(token.into(), AuthenticatedUser::new(operator_id));
        }
    }

    /// Removes a token, making it invalid.
    pub fn remove_token(&self, token: &str) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(token);
        }
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let forced = self
            .force_error
            .read()
            .map_err(|_| AuthError::service_unavailable("mock validator lock poisoned"))?
            .clone();
        if let Some(error) = forced {
            return Err(error);
        }

        self.tokens
            .read()
            .map_err(|_| AuthError::service_unavailable("mock validator lock poisoned"))?
            .get(token)
            .copied()
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registered_token_validates() {
        let validator = MockSessionValidator::new().with_operator("t", OperatorId::new(3));
        let user = validator.validate("t").await.unwrap();
        assert_eq!(user.operator_id, OperatorId::new(3));
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let validator = MockSessionValidator::new();
        assert!(matches!(
            validator.validate("nope").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn removed_token_is_invalid() {
        let validator = MockSessionValidator::new().with_operator("t", OperatorId::new(3));
        validator.remove_token("t");
        assert!(validator.validate("t").await.is_err());
    }

    #[tokio::test]
    async fn forced_error_wins() {
        let validator = MockSessionValidator::new()
            .with_operator("t", OperatorId::new(3))
            .with_error(AuthError::service_unavailable("down"));
        assert!(matches!(
            validator.validate("t").await,
            Err(AuthError::ServiceUnavailable(_))
        ));
    }
}
