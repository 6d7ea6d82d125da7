//! WebSocket adapters for live chat delivery.
//!
//! Visitors and operators hold one connection each. Stored messages are
//! pushed to every connection watching the session plus every operator
//! connection of the session's company.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 ConversationCoordinator                   │
//! │   stores visitor, operator and bot messages               │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            │ MessageBroadcaster
//!                            ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                    RealtimeRouter                          │
//! │   Session groups          Operator groups (per company)   │
//! └──────────────────────────────────────────────────────────┘
//!                            │
//!                            │ bounded queue per connection
//!                            ▼
//!                     WebSocket clients
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket frame types
//! - [`router`] - Connection groups and fan-out
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;
pub mod router;

pub use handler::{websocket_router, ws_handler, WebSocketState, DEFAULT_MAX_FRAME_BYTES};
pub use messages::{
    ClientMessage, ConnectedMessage, NewMessageEvent, ParticipantRole, PongMessage, ServerMessage,
};
pub use router::{ConnectionId, Group, RealtimeRouter, DEFAULT_QUEUE_CAPACITY};
