//! HTTP routes for the visitor widget.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{get_bot, open_session, WidgetHandlers};

pub fn widget_routes(handlers: WidgetHandlers) -> Router {
    Router::new()
        .route("/sessions", post(open_session))
        .route("/bot", get(get_bot))
        .with_state(handlers)
}
