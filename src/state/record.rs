//! Per-connection state.

use super::Peer;
use std::fmt;
use std::sync::Arc;

/// Identity of a connection's transport handle within one [`Hub`](super::Hub).
///
/// Assigned in acceptance order, so sorting by `ConnId` yields insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Liveness state driven by the liveness monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Liveness {
    /// Answered the most recent probe, or has not been probed yet.
    #[default]
    Alive,
    /// A probe is outstanding. Still suspect at the next sweep means terminate.
    Suspect,
}

impl Liveness {
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

/// A connected client as seen by the registry.
#[derive(Debug, Clone)]
pub struct ConnectionRecord {
    pub id: ConnId,
    /// Current display name.
    pub nickname: String,
    pub liveness: Liveness,
    pub peer: Arc<dyn Peer>,
}

impl ConnectionRecord {
    /// A freshly accepted connection: alive, not yet probed.
    pub fn new(id: ConnId, nickname: String, peer: Arc<dyn Peer>) -> Self {
        Self {
            id,
            nickname,
            liveness: Liveness::Alive,
            peer,
        }
    }
}
