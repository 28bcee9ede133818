//! Transport handle abstraction.
//!
//! A [`Peer`] is the registry's only view of a connection's transport. The
//! websocket implementation lives in `network::connection`; tests use
//! [`test_support::RecordingPeer`].

use crate::error::SendError;
use std::fmt;
use std::sync::Arc;

/// Handle to one client's bidirectional transport.
///
/// All methods are non-blocking: they queue work for the connection task and
/// return immediately, so they are safe to call while iterating a registry
/// snapshot.
pub trait Peer: Send + Sync + fmt::Debug {
    /// Queue an encoded payload for delivery.
    fn send(&self, payload: Arc<str>) -> Result<(), SendError>;

    /// Queue a transport-level liveness probe (websocket ping).
    fn probe(&self) -> Result<(), SendError>;

    /// Forcibly drop the transport without a closing handshake.
    ///
    /// Idempotent. The connection task observes the termination and reports
    /// closure through its lifecycle, which removes the record.
    fn terminate(&self);
}
