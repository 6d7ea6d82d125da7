//! HTTP handlers for bot configuration endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireOperator;
use crate::application::handlers::bot::{
    GetBotConfigurationHandler, UpdateBotConfigurationCommand, UpdateBotConfigurationHandler,
};

use super::dto::{BotConfigurationResponse, UpdateBotConfigurationRequest};

#[derive(Clone)]
pub struct BotHandlers {
    get_handler: Arc<GetBotConfigurationHandler>,
    update_handler: Arc<UpdateBotConfigurationHandler>,
}

impl BotHandlers {
    pub fn new(
        get_handler: Arc<GetBotConfigurationHandler>,
        update_handler: Arc<UpdateBotConfigurationHandler>,
    ) -> Self {
        Self {
            get_handler,
            update_handler,
        }
    }
}

/// GET /api/bot - The caller's bot configuration
pub async fn get_bot_configuration(
    State(handlers): State<BotHandlers>,
    RequireOperator(identity): RequireOperator,
) -> Response {
    match handlers.get_handler.handle(&identity).await {
        Ok(config) => (StatusCode::OK, Json(BotConfigurationResponse::from(&config))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// PUT /api/bot - Replace the caller's bot configuration
pub async fn update_bot_configuration(
    State(handlers): State<BotHandlers>,
    RequireOperator(identity): RequireOperator,
    Json(req): Json<UpdateBotConfigurationRequest>,
) -> Response {
    let cmd = UpdateBotConfigurationCommand {
        enabled: req.enabled,
        welcome_message: req.welcome_message,
        options: req.options.into_iter().map(Into::into).collect(),
    };

    match handlers.update_handler.handle(&identity, cmd).await {
        Ok(config) => (StatusCode::OK, Json(BotConfigurationResponse::from(&config))).into_response(),
        Err(e) => e.into_response(),
    }
}
