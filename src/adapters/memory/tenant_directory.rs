//! In-memory tenant directory.
//!
//! Holds operators and access keys registered at startup. Keys are stored
//! under their digest, exactly as the PostgreSQL adapter does.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, OperatorId};
use crate::domain::tenant::{access_key_digest, AccessKeyGrant, OperatorIdentity};
use crate::ports::TenantDirectory;

#[derive(Debug, Clone, Copy)]
struct StoredKey {
    grant: AccessKeyGrant,
    is_active: bool,
}

/// In-memory directory of operators and access keys.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTenantDirectory {
    operators: Arc<RwLock<HashMap<OperatorId, OperatorIdentity>>>,
    keys: Arc<RwLock<HashMap<String, StoredKey>>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an operator.
    pub async fn add_operator(&self, identity: OperatorIdentity) {
        self.operators
            .write()
            .await
            .insert(identity.operator_id, identity);
    }

    /// Register an active access key under the raw token.
    pub async fn add_access_key(&self, token: &str, grant: AccessKeyGrant) {
        self.keys.write().await.insert(
            access_key_digest(token),
            StoredKey {
                grant,
                is_active: true,
            },
        );
    }

    /// Deactivate an access key. Returns false if no key matches.
    pub async fn revoke_access_key(&self, token: &str) -> bool {
        match self.keys.write().await.get_mut(&access_key_digest(token)) {
            Some(stored) => {
                stored.is_active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenantDirectory {
    async fn resolve_by_credential(
        &self,
        operator_id: OperatorId,
    ) -> Result<OperatorIdentity, DomainError> {
        self.operators
            .read()
            .await
            .get(&operator_id)
            .copied()
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::OperatorNotFound,
                    format!("Operator not found: {}", operator_id),
                )
            })
    }

    async fn resolve_by_access_key(&self, token: &str) -> Result<AccessKeyGrant, DomainError> {
        let keys = self.keys.read().await;
        let stored = keys
            .get(&access_key_digest(token))
            .ok_or_else(|| DomainError::new(ErrorCode::AccessKeyNotFound, "Unknown access key"))?;

        if !stored.is_active {
            return Err(DomainError::new(
                ErrorCode::AccessKeyRevoked,
                "Access key has been revoked",
            ));
        }
        Ok(stored.grant)
    }
}
