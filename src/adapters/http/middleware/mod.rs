//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `auth` - Credential resolution and identity extractors

pub mod auth;

pub use auth::{
    auth_middleware, AuthRejection, AuthState, RequireAccessKey, RequireActor, RequireOperator,
    ACCESS_KEY_HEADER,
};
