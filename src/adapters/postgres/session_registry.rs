//! PostgreSQL implementation of SessionRegistry.
//!
//! The partial unique index `sessions_one_open_per_visitor` is what keeps a
//! visitor/owner pair down to one open session; violations surface as
//! `Conflict` so the provided `ensure_open_session` can retry as a lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;

use super::column;
use crate::domain::foundation::{
    CompanyId, DomainError, ErrorCode, OperatorId, SessionId, SessionStatus, Timestamp,
};
use crate::domain::session::ChatSession;
use crate::domain::tenant::SessionOwner;
use crate::ports::{SessionListFilter, SessionRegistry};

const SESSION_COLUMNS: &str = "id, visitor_identifier, visitor_name, status, \
     handoff_requested_at, owner_user_id, company_id, created_at, last_active_at";

/// PostgreSQL implementation of SessionRegistry.
#[derive(Clone)]
pub struct PostgresSessionRegistry {
    pool: PgPool,
}

impl PostgresSessionRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, id: &SessionId) -> Result<bool, DomainError> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM sessions WHERE id = $1)")
                .bind(id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| DomainError::database("Failed to check session existence", e))?;
        Ok(exists)
    }

    /// Turns "no row updated" into either `false` or `SessionNotFound`.
    async fn changed_or_not_found(&self, id: &SessionId, rows: u64) -> Result<bool, DomainError> {
        if rows > 0 {
            return Ok(true);
        }
        if self.exists(id).await? {
            Ok(false)
        } else {
            Err(not_found(id))
        }
    }
}

#[async_trait]
impl SessionRegistry for PostgresSessionRegistry {
    async fn find_by_id(&self, id: &SessionId) -> Result<Option<ChatSession>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sessions WHERE id = $1",
            SESSION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch session", e))?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn find_open(
        &self,
        visitor_identifier: &str,
        owner: &SessionOwner,
    ) -> Result<Option<ChatSession>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            SELECT {} FROM sessions
            WHERE visitor_identifier = $1
              AND owner_user_id = $2
              AND company_id = $3
              AND status = 'open'
            ORDER BY last_active_at DESC
            LIMIT 1
            "#,
            SESSION_COLUMNS
        ))
        .bind(visitor_identifier)
        .bind(owner.operator_id.value())
        .bind(owner.company_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch open session", e))?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn insert_open(&self, session: &ChatSession) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (
                id, visitor_identifier, visitor_name, status, handoff_requested,
                handoff_requested_at, owner_user_id, company_id, created_at, last_active_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.visitor_identifier())
        .bind(session.visitor_name())
        .bind(session.status().as_str())
        .bind(session.handoff_requested())
        .bind(session.handoff_requested_at().map(|t| *t.as_datetime()))
        .bind(session.owner_id().value())
        .bind(session.company_id().value())
        .bind(session.created_at().as_datetime())
        .bind(session.last_active_at().as_datetime())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::new(
                    ErrorCode::Conflict,
                    "An open session already exists for this visitor and owner",
                ))
            }
            Err(e) => Err(DomainError::database("Failed to insert session", e)),
        }
    }

    async fn fill_visitor_name(&self, id: &SessionId, name: &str) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE sessions SET visitor_name = $2 WHERE id = $1 AND visitor_name IS NULL",
        )
        .bind(id.as_uuid())
        .bind(name)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to record visitor name", e))?;
        Ok(())
    }

    async fn touch(&self, id: &SessionId, at: Timestamp) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE sessions SET last_active_at = GREATEST(last_active_at, $2) WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to touch session", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn reopen_if_closed(&self, id: &SessionId, at: Timestamp) -> Result<bool, DomainError> {
        // The locked subquery reports the status as it was before the update.
        let result: Result<Option<(String,)>, sqlx::Error> = sqlx::query_as(
            r#"
            UPDATE sessions s
            SET status = 'open',
                last_active_at = GREATEST(s.last_active_at, $2)
            FROM (SELECT id, status FROM sessions WHERE id = $1 FOR UPDATE) previous
            WHERE s.id = previous.id
            RETURNING previous.status
            "#,
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some((previous,))) => {
                let previous: SessionStatus = previous
                    .parse()
                    .map_err(|e| DomainError::database("Invalid session status", e))?;
                Ok(previous == SessionStatus::Closed)
            }
            Ok(None) => Err(not_found(id)),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(DomainError::new(
                    ErrorCode::Conflict,
                    "Another open session exists for this visitor and owner",
                ))
            }
            Err(e) => Err(DomainError::database("Failed to reopen session", e)),
        }
    }

    async fn mark_closed(&self, id: &SessionId) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE sessions SET status = 'closed' WHERE id = $1 AND status = 'open'",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to close session", e))?;

        self.changed_or_not_found(id, result.rows_affected()).await
    }

    async fn mark_handoff_requested(
        &self,
        id: &SessionId,
        at: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sessions
            SET handoff_requested = true, handoff_requested_at = $2
            WHERE id = $1 AND handoff_requested = false
            "#,
        )
        .bind(id.as_uuid())
        .bind(at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to request handoff", e))?;

        self.changed_or_not_found(id, result.rows_affected()).await
    }

    async fn list(&self, filter: &SessionListFilter) -> Result<Vec<ChatSession>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM sessions
            WHERE company_id = $1
              AND ($2::BIGINT IS NULL OR owner_user_id = $2)
              AND (NOT $3 OR handoff_requested)
            ORDER BY last_active_at DESC, id
            "#,
            SESSION_COLUMNS
        ))
        .bind(filter.company_id.value())
        .bind(filter.owner.map(|o| o.value()))
        .bind(filter.handoff_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list sessions", e))?;

        rows.iter().map(row_to_session).collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn not_found(id: &SessionId) -> DomainError {
    DomainError::new(
        ErrorCode::SessionNotFound,
        format!("Session not found: {}", id),
    )
}

fn row_to_session(row: &PgRow) -> Result<ChatSession, DomainError> {
    let status: String = column(row, "status")?;
    let status: SessionStatus = status
        .parse()
        .map_err(|e| DomainError::database("Invalid session status", e))?;
    let handoff_requested_at: Option<DateTime<Utc>> = column(row, "handoff_requested_at")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let last_active_at: DateTime<Utc> = column(row, "last_active_at")?;

    Ok(ChatSession::reconstitute(
        SessionId::from_uuid(column(row, "id")?),
        column(row, "visitor_identifier")?,
        column(row, "visitor_name")?,
        status,
        handoff_requested_at.map(Timestamp::from_datetime),
        SessionOwner::new(
            OperatorId::new(column(row, "owner_user_id")?),
            CompanyId::new(column(row, "company_id")?),
        ),
        Timestamp::from_datetime(created_at),
        Timestamp::from_datetime(last_active_at),
    ))
}
