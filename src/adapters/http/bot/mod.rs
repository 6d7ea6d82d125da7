//! HTTP adapter for bot configuration endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    BotConfigurationResponse, BotOptionRequest, BotOptionResponse, UpdateBotConfigurationRequest,
};
pub use handlers::BotHandlers;
pub use routes::bot_routes;
