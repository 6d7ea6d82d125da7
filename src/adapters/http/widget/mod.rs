//! HTTP adapter for the visitor widget (access-key authenticated).

mod dto;
mod handlers;
mod routes;

pub use dto::{OpenSessionRequest, WidgetBotResponse};
pub use handlers::WidgetHandlers;
pub use routes::widget_routes;
