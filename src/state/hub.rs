//! The Hub: lifecycle-scoped server state.
//!
//! One `Hub` per server instance owns the connection registry and the
//! process-wide counters. Components receive it by `Arc` instead of reaching
//! for globals, so tests can run independent instances side by side.

use super::{ConnId, ConnectionRegistry, NicknameGenerator};
use crate::config::Config;
use std::sync::atomic::{AtomicU64, Ordering};

/// Settings the Hub needs from configuration.
#[derive(Debug, Clone)]
pub struct HubSettings {
    pub server_name: String,
    pub nickname_prefix: String,
    /// Per-connection outbound queue depth.
    pub outbound_queue: usize,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            server_name: "chatd".to_string(),
            nickname_prefix: crate::config::defaults::default_nickname_prefix(),
            outbound_queue: crate::config::defaults::default_outbound_queue(),
        }
    }
}

impl From<&Config> for HubSettings {
    fn from(config: &Config) -> Self {
        Self {
            server_name: config.server.name.clone(),
            nickname_prefix: config.server.nickname_prefix.clone(),
            outbound_queue: config.limits.outbound_queue,
        }
    }
}

#[derive(Debug)]
pub struct Hub {
    pub registry: ConnectionRegistry,
    pub settings: HubSettings,
    nicknames: NicknameGenerator,
    next_conn: AtomicU64,
}

impl Hub {
    pub fn new(settings: HubSettings) -> Self {
        Self {
            registry: ConnectionRegistry::new(),
            nicknames: NicknameGenerator::new(settings.nickname_prefix.clone()),
            next_conn: AtomicU64::new(1),
            settings,
        }
    }

    /// Allocate the handle identity for a newly accepted transport.
    pub fn next_conn_id(&self) -> ConnId {
        ConnId(self.next_conn.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate the default display name for a newly accepted connection.
    pub fn next_default_nickname(&self) -> String {
        self.nicknames.next()
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubSettings::default())
    }
}
