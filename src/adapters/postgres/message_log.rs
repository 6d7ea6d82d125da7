//! PostgreSQL implementation of MessageLog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use super::column;
use crate::domain::foundation::{
    DomainError, MessageId, OperatorId, SenderType, SessionId, Timestamp,
};
use crate::domain::message::{Message, NewMessage};
use crate::ports::MessageLog;

/// PostgreSQL implementation of MessageLog.
#[derive(Clone)]
pub struct PostgresMessageLog {
    pool: PgPool,
}

impl PostgresMessageLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageLog for PostgresMessageLog {
    async fn append(&self, message: NewMessage) -> Result<Message, DomainError> {
        let author = message.author();
        let is_read = message.stored_as_read();
        let created_at = Timestamp::now();

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO messages (
                session_id, sender_type, sender_id, content, attachment_ref,
                created_at, is_read, read_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $7 THEN $6 END)
            RETURNING id
            "#,
        )
        .bind(message.session_id().as_uuid())
        .bind(author.sender_type().as_str())
        .bind(author.sender_id().map(|id| id.value()))
        .bind(message.content())
        .bind(message.attachment_ref())
        .bind(created_at.as_datetime())
        .bind(is_read)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert message", e))?;

        Ok(message.into_stored(MessageId::new(id), created_at))
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, session_id, sender_type, sender_id, content, attachment_ref,
                   created_at, is_read, read_at
            FROM messages
            WHERE session_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to list messages", e))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn mark_visitor_messages_read(
        &self,
        session_id: &SessionId,
        read_at: Timestamp,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = true, read_at = $2
            WHERE session_id = $1 AND sender_type = 'visitor' AND is_read = false
            "#,
        )
        .bind(session_id.as_uuid())
        .bind(read_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to mark messages read", e))?;

        Ok(result.rows_affected())
    }

    async fn unread_counts(
        &self,
        session_ids: &[SessionId],
    ) -> Result<HashMap<SessionId, u64>, DomainError> {
        let mut counts: HashMap<SessionId, u64> =
            session_ids.iter().map(|id| (*id, 0)).collect();
        if session_ids.is_empty() {
            return Ok(counts);
        }

        let ids: Vec<Uuid> = session_ids.iter().map(|id| *id.as_uuid()).collect();
        let rows: Vec<(Uuid, i64)> = sqlx::query_as(
            r#"
            SELECT session_id, COUNT(*)
            FROM messages
            WHERE session_id = ANY($1) AND sender_type = 'visitor' AND is_read = false
            GROUP BY session_id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to count unread messages", e))?;

        for (session_id, count) in rows {
            counts.insert(SessionId::from_uuid(session_id), count.max(0) as u64);
        }
        Ok(counts)
    }
}

fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
    let sender_type: String = column(row, "sender_type")?;
    let sender_type: SenderType = sender_type
        .parse()
        .map_err(|e| DomainError::database("Invalid sender type", e))?;
    let sender_id: Option<i64> = column(row, "sender_id")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;
    let read_at: Option<DateTime<Utc>> = column(row, "read_at")?;

    Ok(Message {
        id: MessageId::new(column(row, "id")?),
        session_id: SessionId::from_uuid(column(row, "session_id")?),
        sender_type,
        sender_id: sender_id.map(OperatorId::new),
        content: column(row, "content")?,
        attachment_ref: column(row, "attachment_ref")?,
        created_at: Timestamp::from_datetime(created_at),
        is_read: column(row, "is_read")?,
        read_at: read_at.map(Timestamp::from_datetime),
    })
}
