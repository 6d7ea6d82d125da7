//! In-memory adapters for every storage port.
//!
//! Used by tests and for running without a database in development.

mod bot_configuration;
mod message_log;
mod session_registry;
mod tenant_directory;

pub use bot_configuration::InMemoryBotConfigurationRepository;
pub use message_log::InMemoryMessageLog;
pub use session_registry::InMemorySessionRegistry;
pub use tenant_directory::InMemoryTenantDirectory;
