//! Live Chat - multi-tenant visitor/operator chat
//!
//! Website visitors talk to a company's operators over a persistent
//! connection. A per-company bot can answer predefined options before a
//! human steps in.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;
pub mod telemetry;
