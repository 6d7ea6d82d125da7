//! Authentication middleware and extractors for axum.
//!
//! This module provides:
//! - `auth_middleware` - Layer that resolves credentials and injects the acting identity
//! - `RequireOperator` - Extractor that requires an operator bearer token
//! - `RequireAccessKey` - Extractor that requires a widget access key
//! - `RequireActor` - Extractor accepting either
//!
//! # Architecture
//!
//! Operators send `Authorization: Bearer <token>`; the token is checked by the
//! `SessionValidator` port and its operator id resolved through the
//! `TenantDirectory`. Widgets send `X-Access-Key: <key>`, resolved through the
//! directory alone.
//!
//! ```text
//! Request → auth_middleware → injects OperatorIdentity / AccessKeyGrant into extensions
//!                                      ↓
//!                              Handler → Require* extractor reads from extensions
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::foundation::{AuthError, DomainError, ErrorCode};
use crate::domain::tenant::{AccessKeyGrant, Actor, OperatorIdentity};
use crate::ports::{SessionValidator, TenantDirectory};

/// Header carrying a widget access key.
pub const ACCESS_KEY_HEADER: &str = "X-Access-Key";

/// Credential checking shared by the REST middleware and the WebSocket upgrade.
#[derive(Clone)]
pub struct AuthState {
    validator: Arc<dyn SessionValidator>,
    directory: Arc<dyn TenantDirectory>,
}

impl AuthState {
    pub fn new(validator: Arc<dyn SessionValidator>, directory: Arc<dyn TenantDirectory>) -> Self {
        Self {
            validator,
            directory,
        }
    }

    /// Validate a bearer token and resolve the operator's company and role.
    pub async fn authenticate_operator(&self, token: &str) -> Result<OperatorIdentity, AuthRejection> {
        let user = self.validator.validate(token).await?;
        Ok(self
            .directory
            .resolve_by_credential(user.operator_id)
            .await?)
    }

    /// Resolve a raw access key.
    pub async fn authenticate_access_key(&self, key: &str) -> Result<AccessKeyGrant, AuthRejection> {
        Ok(self.directory.resolve_by_access_key(key).await?)
    }
}

/// Authentication middleware.
///
/// This middleware:
/// 1. Resolves a Bearer token to an `OperatorIdentity`, if present
/// 2. Resolves an `X-Access-Key` header to an `AccessKeyGrant`, if present
/// 3. On missing credentials, continues without injecting anything
/// 4. On a presented but invalid credential, returns 401 Unauthorized
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let bearer = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    if let Some(token) = bearer {
        match auth.authenticate_operator(&token).await {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
            }
            Err(rejection) => return rejection.into_response(),
        }
    }

    let access_key = request
        .headers()
        .get(ACCESS_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);

    if let Some(key) = access_key {
        match auth.authenticate_access_key(&key).await {
            Ok(grant) => {
                request.extensions_mut().insert(grant);
            }
            Err(rejection) => return rejection.into_response(),
        }
    }

    next.run(request).await
}

/// Extractor that requires an authenticated operator.
#[derive(Debug, Clone, Copy)]
pub struct RequireOperator(pub OperatorIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireOperator
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OperatorIdentity>()
            .copied()
            .map(RequireOperator)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor that requires a widget access key.
#[derive(Debug, Clone, Copy)]
pub struct RequireAccessKey(pub AccessKeyGrant);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAccessKey
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AccessKeyGrant>()
            .copied()
            .map(RequireAccessKey)
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Extractor accepting an operator or an access key. Operators win when
/// both are present.
#[derive(Debug, Clone, Copy)]
pub struct RequireActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for RequireActor
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<OperatorIdentity>() {
            return Ok(RequireActor(Actor::Operator(*identity)));
        }
        parts
            .extensions
            .get::<AccessKeyGrant>()
            .map(|grant| RequireActor(Actor::Visitor(*grant)))
            .ok_or(AuthRejection::Unauthenticated)
    }
}

/// Rejection type for authentication failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthRejection {
    /// No credential was provided.
    Unauthenticated,
    /// A credential was provided but is not valid.
    InvalidCredential(&'static str),
    /// The access key has been revoked.
    Revoked,
    /// Credentials could not be checked right now.
    ServiceUnavailable,
}

impl From<AuthError> for AuthRejection {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenExpired => AuthRejection::InvalidCredential("Token expired"),
            AuthError::InvalidToken => AuthRejection::InvalidCredential("Invalid token"),
            AuthError::ServiceUnavailable(msg) => {
                tracing::error!("Auth service unavailable: {}", msg);
                AuthRejection::ServiceUnavailable
            }
        }
    }
}

impl From<DomainError> for AuthRejection {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::AccessKeyRevoked => AuthRejection::Revoked,
            ErrorCode::OperatorNotFound => AuthRejection::InvalidCredential("Unknown operator"),
            ErrorCode::AccessKeyNotFound => AuthRejection::InvalidCredential("Unknown access key"),
            _ => {
                tracing::error!(error = %err, "Credential lookup failed");
                AuthRejection::ServiceUnavailable
            }
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Authentication required",
            ),
            AuthRejection::InvalidCredential(message) => {
                (StatusCode::UNAUTHORIZED, "AUTH_ERROR", message)
            }
            AuthRejection::Revoked => (
                StatusCode::UNAUTHORIZED,
                "REVOKED",
                "Access key has been revoked",
            ),
            AuthRejection::ServiceUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "AUTH_UNAVAILABLE",
                "Authentication service unavailable",
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
