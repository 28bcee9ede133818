//! State management module.
//!
//! Contains the Hub (shared server state), the connection registry and the
//! per-connection records it holds.

mod hub;
mod nickname;
mod peer;
mod record;
mod registry;

pub use hub::{Hub, HubSettings};
pub use nickname::NicknameGenerator;
pub use peer::Peer;
pub use record::{ConnId, ConnectionRecord, Liveness};
pub use registry::{ConnectionRegistry, ForEachReport, SweepAction};

#[cfg(test)]
pub(crate) use peer::test_support;
