//! Broadcast fan-out.
//!
//! Encodes a payload once and queues it for every connection in a registry
//! snapshot. A failed send to one recipient is logged and counted; it never
//! reaches the caller and never stops delivery to the rest.

use crate::state::ConnectionRegistry;
use chat_proto::ServerMessage;
use std::sync::Arc;
use tracing::{debug, error};

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub delivered: usize,
    pub failed: usize,
}

/// Send `message` to every registered connection, the sender included.
///
/// Connections registered after the snapshot is taken miss this broadcast
/// but receive every later one.
pub fn broadcast(registry: &ConnectionRegistry, message: &ServerMessage) -> Delivery {
    let payload: Arc<str> = match message.to_json() {
        Ok(json) => json.into(),
        Err(e) => {
            error!(error = %e, "Failed to encode broadcast payload");
            return Delivery::default();
        }
    };

    let report = registry.for_each(|record| {
        record.peer.send(Arc::clone(&payload)).inspect_err(|e| {
            crate::metrics::record_send_failure(e.error_code());
        })
    });

    crate::metrics::record_broadcast(report.succeeded);
    debug!(
        kind = message_kind(message),
        delivered = report.succeeded,
        failed = report.failed,
        "Broadcast"
    );

    Delivery {
        delivered: report.succeeded,
        failed: report.failed,
    }
}

fn message_kind(message: &ServerMessage) -> &'static str {
    match message {
        ServerMessage::Notification { .. } => "notification",
        ServerMessage::Message { .. } => "message",
    }
}
