//! PostgreSQL implementation of TenantDirectory.

use async_trait::async_trait;
use sqlx::PgPool;

use super::column;
use crate::domain::foundation::{
    AccessKeyId, CompanyId, DomainError, ErrorCode, OperatorId, OperatorRole,
};
use crate::domain::tenant::{access_key_digest, AccessKeyGrant, OperatorIdentity};
use crate::ports::TenantDirectory;

/// PostgreSQL implementation of TenantDirectory.
#[derive(Clone)]
pub struct PostgresTenantDirectory {
    pool: PgPool,
}

impl PostgresTenantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TenantDirectory for PostgresTenantDirectory {
    async fn resolve_by_credential(
        &self,
        operator_id: OperatorId,
    ) -> Result<OperatorIdentity, DomainError> {
        let row = sqlx::query("SELECT id, company_id, role FROM users WHERE id = $1")
            .bind(operator_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to fetch operator", e))?;

        let not_found = || {
            DomainError::new(
                ErrorCode::OperatorNotFound,
                format!("Operator not found: {}", operator_id),
            )
        };
        let row = row.ok_or_else(not_found)?;

        // Operators without a company cannot act on any tenant's data.
        let company_id: Option<i64> = column(&row, "company_id")?;
        let company_id = company_id.ok_or_else(not_found)?;

        let role: String = column(&row, "role")?;
        let role: OperatorRole = role
            .parse()
            .map_err(|e| DomainError::database("Invalid operator role", e))?;

        Ok(OperatorIdentity::new(
            operator_id,
            CompanyId::new(company_id),
            role,
        ))
    }

    async fn resolve_by_access_key(&self, token: &str) -> Result<AccessKeyGrant, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, company_id, is_active
            FROM access_keys
            WHERE key_digest = $1
            "#,
        )
        .bind(access_key_digest(token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch access key", e))?
        .ok_or_else(|| DomainError::new(ErrorCode::AccessKeyNotFound, "Unknown access key"))?;

        let is_active: bool = column(&row, "is_active")?;
        if !is_active {
            return Err(DomainError::new(
                ErrorCode::AccessKeyRevoked,
                "Access key has been revoked",
            ));
        }

        Ok(AccessKeyGrant {
            key_id: AccessKeyId::new(column(&row, "id")?),
            company_id: CompanyId::new(column(&row, "company_id")?),
            issuing_operator: OperatorId::new(column(&row, "user_id")?),
        })
    }
}
