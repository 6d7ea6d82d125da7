//! HTTP routes for bot configuration endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_bot_configuration, update_bot_configuration, BotHandlers};

pub fn bot_routes(handlers: BotHandlers) -> Router {
    Router::new()
        .route("/", get(get_bot_configuration).put(update_bot_configuration))
        .with_state(handlers)
}
