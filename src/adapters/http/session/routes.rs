//! HTTP routes for session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    close_session, list_messages, list_sessions, post_message, request_handoff, SessionHandlers,
};

/// Creates the session router with all endpoints.
pub fn session_routes(handlers: SessionHandlers) -> Router {
    Router::new()
        .route("/", get(list_sessions))
        .route("/:id/messages", get(list_messages).post(post_message))
        .route("/:id/close", post(close_session))
        .route("/:id/handoff", post(request_handoff))
        .with_state(handlers)
}
