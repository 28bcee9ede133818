//! Websocket implementation of [`Peer`].

use crate::error::SendError;
use crate::state::Peer;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Work queued for a connection's writer task.
#[derive(Debug)]
pub enum Outbound {
    Text(Arc<str>),
    Ping,
}

/// Handle held by the registry for one websocket connection.
///
/// Sends go through a bounded queue drained by the writer task. `kill` is
/// shared with the connection task; cancelling it drops the socket without
/// a closing handshake.
#[derive(Debug)]
pub struct WsPeer {
    tx: mpsc::Sender<Outbound>,
    kill: CancellationToken,
}

impl WsPeer {
    pub fn new(tx: mpsc::Sender<Outbound>, kill: CancellationToken) -> Self {
        Self { tx, kill }
    }

    fn enqueue(&self, item: Outbound) -> Result<(), SendError> {
        if self.kill.is_cancelled() {
            return Err(SendError::Closed);
        }
        self.tx.try_send(item).map_err(|e| match e {
            TrySendError::Full(_) => SendError::QueueFull,
            TrySendError::Closed(_) => SendError::Closed,
        })
    }
}

impl Peer for WsPeer {
    fn send(&self, payload: Arc<str>) -> Result<(), SendError> {
        self.enqueue(Outbound::Text(payload))
    }

    fn probe(&self) -> Result<(), SendError> {
        self.enqueue(Outbound::Ping)
    }

    fn terminate(&self) {
        self.kill.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_queues_text() {
        let (tx, mut rx) = mpsc::channel(4);
        let peer = WsPeer::new(tx, CancellationToken::new());

        peer.send(Arc::from("hello")).unwrap();
        peer.probe().unwrap();

        assert!(matches!(rx.recv().await, Some(Outbound::Text(t)) if &*t == "hello"));
        assert!(matches!(rx.recv().await, Some(Outbound::Ping)));
    }

    #[tokio::test]
    async fn full_queue_is_reported() {
        let (tx, _rx) = mpsc::channel(1);
        let peer = WsPeer::new(tx, CancellationToken::new());

        peer.send(Arc::from("a")).unwrap();
        assert_eq!(peer.send(Arc::from("b")), Err(SendError::QueueFull));
    }

    #[tokio::test]
    async fn closed_queue_is_reported() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let peer = WsPeer::new(tx, CancellationToken::new());
        assert_eq!(peer.probe(), Err(SendError::Closed));
    }

    #[tokio::test]
    async fn terminate_cancels_and_rejects_sends() {
        let (tx, _rx) = mpsc::channel(4);
        let kill = CancellationToken::new();
        let peer = WsPeer::new(tx, kill.clone());

        peer.terminate();
        peer.terminate();
        assert!(kill.is_cancelled());
        assert_eq!(peer.send(Arc::from("late")), Err(SendError::Closed));
    }
}
