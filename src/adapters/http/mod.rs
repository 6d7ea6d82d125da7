//! HTTP adapters - REST API implementations.
//!
//! Each area has its own dto/handlers/routes module. Everything under `/api`
//! runs behind `auth_middleware`; handlers pick the identity they need with
//! the `Require*` extractors.

pub mod bot;
pub mod error;
pub mod health;
pub mod middleware;
pub mod session;
pub mod widget;

pub use bot::{bot_routes, BotHandlers};
pub use error::ErrorResponse;
pub use health::health_routes;
pub use session::{session_routes, SessionHandlers};
pub use widget::{widget_routes, WidgetHandlers};
