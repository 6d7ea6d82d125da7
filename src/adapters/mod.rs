//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - Operator token validation (JWT, mock)
//! - `http` - REST API for operators and the widget
//! - `memory` - In-memory storage for tests and local runs
//! - `postgres` - PostgreSQL storage
//! - `websocket` - Real-time delivery to connected clients

pub mod auth;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;
