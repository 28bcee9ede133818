//! Default display name generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generates default display names: prefix followed by a process-wide counter.
///
/// The counter is bumped once per accepted connection and is never
/// decremented, so a name is never handed out twice even after its owner
/// disconnects.
#[derive(Debug)]
pub struct NicknameGenerator {
    prefix: String,
    counter: AtomicU64,
}

/// First connection is `<prefix>1`.
const NICKNAME_COUNTER_START: u64 = 1;

impl NicknameGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(NICKNAME_COUNTER_START),
        }
    }

    /// Generate the next default display name.
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}
