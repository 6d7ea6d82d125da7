//! Tenant directory port.
//!
//! Resolves the company behind an operator credential or a visitor-facing
//! access key. Lookups only; issuing credentials and keys happens elsewhere.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OperatorId};
use crate::domain::tenant::{AccessKeyGrant, OperatorIdentity};

/// Resolves acting identities to their company.
///
/// # Contract
///
/// - `OperatorNotFound` if the operator does not exist or has no company
/// - `AccessKeyNotFound` if no key matches the token
/// - `AccessKeyRevoked` if the key exists but is inactive
/// - No side effects
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Resolve an operator id (taken from a validated bearer credential).
    async fn resolve_by_credential(
        &self,
        operator_id: OperatorId,
    ) -> Result<OperatorIdentity, DomainError>;

    /// Resolve a raw access key token as presented by the widget.
    async fn resolve_by_access_key(&self, token: &str) -> Result<AccessKeyGrant, DomainError>;
}
