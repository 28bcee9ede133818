//! Liveness monitor.
//!
//! Probe now, verify next cycle: each sweep probes every alive connection
//! and marks it suspect; a connection still suspect at the following sweep
//! missed a whole interval and is terminated. A probe response at any time
//! flips the connection back to alive.
//!
//! Termination only drops the transport. The record leaves the registry
//! when the connection's lifecycle observes the closure.

use crate::state::{ConnId, ConnectionRegistry, Hub, SweepAction};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Outcome of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub probed: usize,
    pub terminated: usize,
}

/// Run one sweep over every registered connection.
pub fn sweep(registry: &ConnectionRegistry) -> SweepReport {
    let mut report = SweepReport::default();

    for id in registry.ids() {
        match registry.sweep_entry(id) {
            Some(SweepAction::Terminate(peer)) => {
                info!(conn = %id, "Liveness probe unanswered - terminating");
                peer.terminate();
                crate::metrics::record_liveness_termination();
                report.terminated += 1;
            }
            Some(SweepAction::Probe(peer)) => {
                if let Err(e) = peer.probe() {
                    // Still counts as probed: the connection is suspect either way.
                    debug!(conn = %id, error = %e, "Failed to queue liveness probe");
                }
                report.probed += 1;
            }
            // Closed between listing and sweeping.
            None => {}
        }
    }

    report
}

/// Record a probe response. Returns `false` if the connection is gone.
pub fn acknowledge(registry: &ConnectionRegistry, id: ConnId) -> bool {
    let found = registry.mark_alive(id);
    if found {
        debug!(conn = %id, "Liveness probe answered");
    }
    found
}

/// Periodic sweeper bound to one [`Hub`].
pub struct LivenessMonitor {
    hub: Arc<Hub>,
    interval: Duration,
}

impl LivenessMonitor {
    pub fn new(hub: Arc<Hub>, interval: Duration) -> Self {
        Self { hub, interval }
    }

    /// Start sweeping every interval until `shutdown` is cancelled.
    ///
    /// The first sweep runs one full interval after start. Cancelling the
    /// token stops the task and releases its timer.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    #[instrument(skip_all, name = "liveness")]
    async fn run(self, shutdown: CancellationToken) {
        if self.interval.is_zero() {
            warn!("Liveness interval is zero - monitor disabled");
            return;
        }

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_ms = self.interval.as_millis() as u64, "Liveness monitor started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Liveness monitor stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let report = sweep(&self.hub.registry);
                    if report != SweepReport::default() {
                        debug!(probed = report.probed, terminated = report.terminated, "Liveness sweep");
                    }
                }
            }
        }
    }
}
