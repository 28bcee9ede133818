//! chatd - broadcast chat daemon over WebSocket.
//!
//! Clients connect, get a generated display name, and every chat line or
//! system notice is fanned out to every connected client. Dead clients are
//! found by ping/pong probing and dropped.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod metrics;
pub mod network;
pub mod state;
