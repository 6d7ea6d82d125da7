//! PostgreSQL implementation of BotConfigurationRepository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use std::collections::HashSet;

use super::column;
use crate::domain::bot::{BotAction, BotConfiguration, BotConfigurationUpdate, BotOption};
use crate::domain::foundation::{BotOptionId, CompanyId, DomainError};
use crate::ports::BotConfigurationRepository;

/// PostgreSQL implementation of BotConfigurationRepository.
#[derive(Clone)]
pub struct PostgresBotConfigurationRepository {
    pool: PgPool,
}

impl PostgresBotConfigurationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BotConfigurationRepository for PostgresBotConfigurationRepository {
    async fn find_by_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<BotConfiguration>, DomainError> {
        let row = sqlx::query(
            "SELECT enabled, welcome_message FROM bot_configurations WHERE company_id = $1",
        )
        .bind(company_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch bot configuration", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let option_rows = sqlx::query(
            r#"
            SELECT id, label, action, reply_text, link_url, sort_order, is_active
            FROM bot_options
            WHERE company_id = $1
            ORDER BY sort_order, id
            "#,
        )
        .bind(company_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch bot options", e))?;

        Ok(Some(BotConfiguration {
            company_id,
            enabled: column(&row, "enabled")?,
            welcome_message: column(&row, "welcome_message")?,
            options: option_rows
                .iter()
                .map(row_to_option)
                .collect::<Result<Vec<_>, _>>()?,
        }))
    }

    async fn save(&self, update: &BotConfigurationUpdate) -> Result<BotConfiguration, DomainError> {
        let company_id = update.company_id.value();
        let welcome_message = update
            .welcome_message
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty());

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to begin transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO bot_configurations (company_id, enabled, welcome_message, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (company_id) DO UPDATE
            SET enabled = EXCLUDED.enabled,
                welcome_message = EXCLUDED.welcome_message,
                updated_at = now()
            "#,
        )
        .bind(company_id)
        .bind(update.enabled)
        .bind(welcome_message)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to upsert bot configuration", e))?;

        let existing: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM bot_options WHERE company_id = $1 FOR UPDATE")
                .bind(company_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(|e| DomainError::database("Failed to fetch bot options", e))?;
        let existing: HashSet<i64> = existing.into_iter().map(|(id,)| id).collect();

        let mut options = Vec::with_capacity(update.options.len());
        for draft in &update.options {
            let option = draft.clone().into_option(BotOptionId::new(0));
            let id = match draft.id.map(|id| id.value()) {
                Some(id) if existing.contains(&id) => {
                    sqlx::query(
                        r#"
                        UPDATE bot_options
                        SET label = $3, action = $4, reply_text = $5, link_url = $6,
                            sort_order = $7, is_active = $8
                        WHERE id = $1 AND company_id = $2
                        "#,
                    )
                    .bind(id)
                    .bind(company_id)
                    .bind(&option.label)
                    .bind(option.action.as_str())
                    .bind(&option.reply_text)
                    .bind(&option.link_url)
                    .bind(option.sort_order)
                    .bind(option.is_active)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| DomainError::database("Failed to update bot option", e))?;
                    id
                }
                _ => {
                    let (id,): (i64,) = sqlx::query_as(
                        r#"
                        INSERT INTO bot_options (
                            company_id, label, action, reply_text, link_url, sort_order, is_active
                        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                        RETURNING id
                        "#,
                    )
                    .bind(company_id)
                    .bind(&option.label)
                    .bind(option.action.as_str())
                    .bind(&option.reply_text)
                    .bind(&option.link_url)
                    .bind(option.sort_order)
                    .bind(option.is_active)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| DomainError::database("Failed to insert bot option", e))?;
                    id
                }
            };
            options.push(BotOption {
                id: BotOptionId::new(id),
                ..option
            });
        }

        let kept: Vec<i64> = options.iter().map(|o| o.id.value()).collect();
        sqlx::query("DELETE FROM bot_options WHERE company_id = $1 AND NOT (id = ANY($2))")
            .bind(company_id)
            .bind(&kept)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to remove bot options", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(BotConfiguration {
            company_id: update.company_id,
            enabled: update.enabled,
            welcome_message: welcome_message.map(str::to_string),
            options,
        })
    }
}

fn row_to_option(row: &PgRow) -> Result<BotOption, DomainError> {
    let action: String = column(row, "action")?;
    let action: BotAction = action
        .parse()
        .map_err(|e| DomainError::database("Invalid bot action", e))?;

    Ok(BotOption {
        id: BotOptionId::new(column(row, "id")?),
        label: column(row, "label")?,
        action,
        reply_text: column(row, "reply_text")?,
        link_url: column(row, "link_url")?,
        sort_order: column(row, "sort_order")?,
        is_active: column(row, "is_active")?,
    })
}
