//! PostgreSQL adapters - Database implementations for storage ports.
//!
//! - `PostgresTenantDirectory` - Operator and access-key lookups
//! - `PostgresSessionRegistry` - Sessions with the one-open-per-visitor index
//! - `PostgresMessageLog` - Append-only messages and read state
//! - `PostgresBotConfigurationRepository` - Per-company bot options
//!
//! Every mutating operation is a single conditional statement, so
//! concurrent requests never interleave inside one.

mod bot_configuration;
mod message_log;
mod session_registry;
mod tenant_directory;

pub use bot_configuration::PostgresBotConfigurationRepository;
pub use message_log::PostgresMessageLog;
pub use session_registry::PostgresSessionRegistry;
pub use tenant_directory::PostgresTenantDirectory;

use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::domain::foundation::DomainError;

/// Reads a column, mapping failures to a database error naming the column.
fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(&format!("Failed to get {}", name), e))
}
