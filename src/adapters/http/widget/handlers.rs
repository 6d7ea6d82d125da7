//! HTTP handlers for the visitor widget.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::middleware::RequireAccessKey;
use crate::adapters::http::session::SessionResponse;
use crate::application::handlers::bot::GetWidgetBotHandler;
use crate::application::handlers::session::{OpenWidgetSessionCommand, OpenWidgetSessionHandler};

use super::dto::{OpenSessionRequest, WidgetBotResponse};

#[derive(Clone)]
pub struct WidgetHandlers {
    open_session_handler: Arc<OpenWidgetSessionHandler>,
    bot_handler: Arc<GetWidgetBotHandler>,
}

impl WidgetHandlers {
    pub fn new(
        open_session_handler: Arc<OpenWidgetSessionHandler>,
        bot_handler: Arc<GetWidgetBotHandler>,
    ) -> Self {
        Self {
            open_session_handler,
            bot_handler,
        }
    }
}

/// POST /api/widget/sessions - The visitor's open session, created if needed
pub async fn open_session(
    State(handlers): State<WidgetHandlers>,
    RequireAccessKey(grant): RequireAccessKey,
    Json(req): Json<OpenSessionRequest>,
) -> Response {
    let cmd = OpenWidgetSessionCommand {
        grant,
        visitor_identifier: req.visitor_identifier,
        visitor_name: req.visitor_name,
    };

    match handlers.open_session_handler.handle(cmd).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/widget/bot - Welcome text and active options
pub async fn get_bot(
    State(handlers): State<WidgetHandlers>,
    RequireAccessKey(grant): RequireAccessKey,
) -> Response {
    match handlers.bot_handler.handle(&grant).await {
        Ok(view) => (StatusCode::OK, Json(WidgetBotResponse::from(&view))).into_response(),
        Err(e) => e.into_response(),
    }
}
