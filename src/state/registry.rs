//! The connection registry: the live set of broadcast recipients.
//!
//! Backed by a `DashMap` keyed by [`ConnId`]. Every read that leads to a
//! peer call clones what it needs and drops the shard guard first: peers may
//! trigger a close that re-enters the registry, and a held guard would
//! deadlock.

use super::{ConnId, ConnectionRecord, Liveness, Peer};
use crate::error::RegistryError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fmt::Display;
use std::sync::Arc;
use tracing::debug;

/// What the liveness sweep must do for one connection.
#[derive(Debug, Clone)]
pub enum SweepAction {
    /// The connection was alive; it is now suspect and must be probed.
    Probe(Arc<dyn Peer>),
    /// The connection missed its previous probe and must be terminated.
    Terminate(Arc<dyn Peer>),
}

/// Outcome of [`ConnectionRegistry::for_each`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForEachReport {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    records: DashMap<ConnId, ConnectionRecord>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record. Fails if the handle is already registered; the
    /// existing record is left untouched.
    pub fn add(&self, record: ConnectionRecord) -> Result<(), RegistryError> {
        match self.records.entry(record.id) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateConnection(record.id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Remove a record, returning it if it was present.
    ///
    /// Idempotent: a second call for the same handle returns `None`.
    pub fn remove(&self, id: ConnId) -> Option<ConnectionRecord> {
        self.records.remove(&id).map(|(_, record)| record)
    }

    pub fn get(&self, id: ConnId) -> Option<ConnectionRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }

    pub fn contains(&self, id: ConnId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current display name of a connection.
    pub fn nickname(&self, id: ConnId) -> Option<String> {
        self.records.get(&id).map(|r| r.nickname.clone())
    }

    /// Replace a connection's display name, returning the previous one.
    ///
    /// The read and the write happen under the same shard lock, so no reader
    /// observes a half-applied rename. Returns `None` if the connection is
    /// not registered.
    pub fn rename(&self, id: ConnId, nickname: String) -> Option<String> {
        self.records
            .get_mut(&id)
            .map(|mut r| std::mem::replace(&mut r.nickname, nickname))
    }

    /// Mark a connection alive after a probe response. Returns `false` if the
    /// connection is no longer registered.
    pub fn mark_alive(&self, id: ConnId) -> bool {
        match self.records.get_mut(&id) {
            Some(mut r) => {
                r.liveness = Liveness::Alive;
                true
            }
            None => false,
        }
    }

    /// Advance one connection's liveness state for a sweep.
    ///
    /// Alive becomes suspect and yields [`SweepAction::Probe`]; suspect stays
    /// suspect and yields [`SweepAction::Terminate`]. The check and the flip
    /// are a single step under the shard lock, so a probe response racing the
    /// sweep either lands before (connection probed again) or after
    /// (connection flipped back to alive).
    pub fn sweep_entry(&self, id: ConnId) -> Option<SweepAction> {
        let mut r = self.records.get_mut(&id)?;
        let peer = Arc::clone(&r.peer);
        match r.liveness {
            Liveness::Suspect => Some(SweepAction::Terminate(peer)),
            Liveness::Alive => {
                r.liveness = Liveness::Suspect;
                Some(SweepAction::Probe(peer))
            }
        }
    }

    /// Registered ids in insertion order.
    pub fn ids(&self) -> Vec<ConnId> {
        let mut ids: Vec<ConnId> = self.records.iter().map(|r| *r.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Stable copy of every record, in insertion order.
    ///
    /// Records added or removed after the snapshot is taken are not reflected.
    pub fn snapshot(&self) -> Vec<ConnectionRecord> {
        let mut records: Vec<ConnectionRecord> =
            self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_unstable_by_key(|r| r.id);
        records
    }

    /// Apply `f` to a snapshot of every record.
    ///
    /// A failure for one record is logged and counted; it never stops the
    /// iteration.
    pub fn for_each<F, E>(&self, mut f: F) -> ForEachReport
    where
        F: FnMut(&ConnectionRecord) -> Result<(), E>,
        E: Display,
    {
        let mut report = ForEachReport::default();
        for record in self.snapshot() {
            match f(&record) {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    debug!(conn = %record.id, nick = %record.nickname, error = %e, "Skipping recipient");
                    report.failed += 1;
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::RecordingPeer;

    fn record(id: u64, nick: &str) -> ConnectionRecord {
        ConnectionRecord::new(ConnId(id), nick.to_string(), RecordingPeer::new())
    }

    #[test]
    fn get_returns_record_until_removed() {
        let registry = ConnectionRegistry::new();
        registry.add(record(1, "a")).unwrap();
        registry.add(record(2, "b")).unwrap();

        assert_eq!(registry.get(ConnId(1)).unwrap().nickname, "a");
        assert_eq!(registry.get(ConnId(2)).unwrap().nickname, "b");

        assert!(registry.remove(ConnId(1)).is_some());
        assert!(registry.get(ConnId(1)).is_none());
        assert!(registry.get(ConnId(2)).is_some());
    }

    #[test]
    fn duplicate_add_is_rejected_and_keeps_original() {
        let registry = ConnectionRegistry::new();
        registry.add(record(7, "first")).unwrap();

        let err = registry.add(record(7, "second")).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateConnection(ConnId(7)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.nickname(ConnId(7)).as_deref(), Some("first"));
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = ConnectionRegistry::new();
        registry.add(record(1, "a")).unwrap();

        assert!(registry.remove(ConnId(1)).is_some());
        assert!(registry.remove(ConnId(1)).is_none());
        assert!(registry.remove(ConnId(99)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn rename_returns_previous_name() {
        let registry = ConnectionRegistry::new();
        registry.add(record(1, "AnonymousUser1")).unwrap();

        let old = registry.rename(ConnId(1), "Alice".to_string());
        assert_eq!(old.as_deref(), Some("AnonymousUser1"));
        assert_eq!(registry.nickname(ConnId(1)).as_deref(), Some("Alice"));
        assert!(registry.rename(ConnId(2), "ghost".to_string()).is_none());
    }

    #[test]
    fn snapshot_is_in_insertion_order() {
        let registry = ConnectionRegistry::new();
        for id in [5, 1, 9, 3] {
            registry.add(record(id, &format!("n{id}"))).unwrap();
        }
        let ids: Vec<u64> = registry.snapshot().iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 3, 5, 9]);
        assert_eq!(registry.ids(), vec![ConnId(1), ConnId(3), ConnId(5), ConnId(9)]);
    }

    #[test]
    fn for_each_continues_past_failures() {
        let registry = ConnectionRegistry::new();
        for id in 1..=4 {
            registry.add(record(id, "x")).unwrap();
        }

        let mut visited = Vec::new();
        let report = registry.for_each(|r| {
            visited.push(r.id.0);
            if r.id.0 == 2 { Err("boom") } else { Ok(()) }
        });

        assert_eq!(visited, vec![1, 2, 3, 4]);
        assert_eq!(report, ForEachReport { succeeded: 3, failed: 1 });
    }

    #[test]
    fn for_each_tolerates_removal_during_iteration() {
        let registry = ConnectionRegistry::new();
        for id in 1..=3 {
            registry.add(record(id, "x")).unwrap();
        }

        let report = registry.for_each(|r| {
            registry.remove(r.id);
            Ok::<(), &str>(())
        });

        assert_eq!(report.succeeded, 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn sweep_entry_probes_then_terminates() {
        let registry = ConnectionRegistry::new();
        registry.add(record(1, "a")).unwrap();

        assert!(matches!(registry.sweep_entry(ConnId(1)), Some(SweepAction::Probe(_))));
        assert_eq!(registry.get(ConnId(1)).unwrap().liveness, Liveness::Suspect);
        assert!(matches!(registry.sweep_entry(ConnId(1)), Some(SweepAction::Terminate(_))));
        assert!(registry.sweep_entry(ConnId(2)).is_none());
    }

    #[test]
    fn mark_alive_clears_suspicion() {
        let registry = ConnectionRegistry::new();
        registry.add(record(1, "a")).unwrap();
        registry.sweep_entry(ConnId(1));

        assert!(registry.mark_alive(ConnId(1)));
        assert!(registry.get(ConnId(1)).unwrap().liveness.is_alive());
        assert!(!registry.mark_alive(ConnId(2)));
    }

    #[test]
    fn concurrent_add_remove_and_iterate() {
        let registry = Arc::new(ConnectionRegistry::new());
        let writers: Vec<_> = (0..4u64)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        let id = t * 1000 + i;
                        registry.add(record(id, "x")).unwrap();
                        if i % 2 == 0 {
                            registry.remove(ConnId(id));
                        }
                    }
                })
            })
            .collect();
        let reader = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    let snap = registry.snapshot();
                    assert!(snap.windows(2).all(|w| w[0].id < w[1].id));
                }
            })
        };

        for w in writers {
            w.join().unwrap();
        }
        reader.join().unwrap();
        assert_eq!(registry.len(), 4 * 125);
    }
}
