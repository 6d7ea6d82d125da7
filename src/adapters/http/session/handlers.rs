//! HTTP handlers for session endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::parse_session_id;
use crate::adapters::http::middleware::{RequireActor, RequireOperator};
use crate::application::handlers::conversation::{ConversationCoordinator, OperatorActionCommand};
use crate::application::handlers::session::{
    CloseSessionCommand, CloseSessionHandler, ListMessagesHandler, ListMessagesQuery,
    ListSessionsHandler, ListSessionsQuery,
};

use super::dto::{
    ListSessionsParams, MessageResponse, PostMessageRequest, SessionListResponse, SessionResponse,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SessionHandlers {
    list_handler: Arc<ListSessionsHandler>,
    messages_handler: Arc<ListMessagesHandler>,
    close_handler: Arc<CloseSessionHandler>,
    coordinator: Arc<ConversationCoordinator>,
}

impl SessionHandlers {
    pub fn new(
        list_handler: Arc<ListSessionsHandler>,
        messages_handler: Arc<ListMessagesHandler>,
        close_handler: Arc<CloseSessionHandler>,
        coordinator: Arc<ConversationCoordinator>,
    ) -> Self {
        Self {
            list_handler,
            messages_handler,
            close_handler,
            coordinator,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /api/sessions - Sessions visible to the operator, with unread counts
pub async fn list_sessions(
    State(handlers): State<SessionHandlers>,
    RequireOperator(identity): RequireOperator,
    Query(params): Query<ListSessionsParams>,
) -> Response {
    let query = ListSessionsQuery {
        identity,
        handoff_only: params.handoff,
    };

    match handlers.list_handler.handle(query).await {
        Ok(list) => (StatusCode::OK, Json(SessionListResponse::from(list))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /api/sessions/:id/messages - History, marking visitor messages read
pub async fn list_messages(
    State(handlers): State<SessionHandlers>,
    RequireOperator(identity): RequireOperator,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let query = ListMessagesQuery {
        identity,
        session_id,
    };

    match handlers.messages_handler.handle(query).await {
        Ok(messages) => {
            let response: Vec<MessageResponse> = messages.iter().map(Into::into).collect();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/sessions/:id/messages - Operator reply
pub async fn post_message(
    State(handlers): State<SessionHandlers>,
    RequireOperator(identity): RequireOperator,
    Path(session_id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = OperatorActionCommand {
        identity,
        session_id,
        content: req.content,
        attachment_ref: req.attachment_ref,
    };

    match handlers.coordinator.handle_operator_action(cmd).await {
        Ok(message) => (StatusCode::CREATED, Json(MessageResponse::from(&message))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/sessions/:id/close - Close a session
pub async fn close_session(
    State(handlers): State<SessionHandlers>,
    RequireOperator(identity): RequireOperator,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let cmd = CloseSessionCommand {
        identity,
        session_id,
    };

    match handlers.close_handler.handle(cmd).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /api/sessions/:id/handoff - Ask for a human (operator or access key)
pub async fn request_handoff(
    State(handlers): State<SessionHandlers>,
    RequireActor(actor): RequireActor,
    Path(session_id): Path<String>,
) -> Response {
    let session_id = match parse_session_id(&session_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers.coordinator.request_handoff(&session_id, &actor).await {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(&session))).into_response(),
        Err(e) => e.into_response(),
    }
}
