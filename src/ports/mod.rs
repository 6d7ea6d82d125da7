//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `TenantDirectory` - Operator and access-key resolution
//! - `SessionRegistry` - Session lifecycle and handoff flag
//! - `MessageLog` - Append-only messages with read state
//! - `BotConfigurationRepository` - Per-company bot options
//!
//! ## Delivery and Auth Ports
//!
//! - `MessageBroadcaster` - Real-time fan-out of stored messages
//! - `SessionValidator` - Bearer token validation

mod bot_configuration_repository;
mod message_broadcaster;
mod message_log;
mod session_registry;
mod session_validator;
mod tenant_directory;

pub use bot_configuration_repository::BotConfigurationRepository;
pub use message_broadcaster::MessageBroadcaster;
pub use message_log::MessageLog;
pub use session_registry::{SessionListFilter, SessionRegistry, ENSURE_OPEN_SESSION_ATTEMPTS};
pub use session_validator::SessionValidator;
pub use tenant_directory::TenantDirectory;
