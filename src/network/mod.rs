//! Network module.
//!
//! Contains the Gateway (websocket listener), the per-connection handler and
//! lifecycle, and the liveness monitor.

mod connection;
mod gateway;
pub mod liveness;

pub use connection::Connection;
pub use gateway::Gateway;
pub use liveness::LivenessMonitor;
