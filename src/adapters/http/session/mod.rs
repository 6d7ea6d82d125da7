//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ListSessionsParams, MessageResponse, PostMessageRequest, SessionListResponse, SessionResponse,
    SessionSummaryResponse,
};
pub use handlers::SessionHandlers;
pub use routes::session_routes;
