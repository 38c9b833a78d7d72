//! Version timestamps for snapshot keys

use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

/// Issues Unix-millisecond timestamps that never repeat within one clock.
///
/// Two snapshots written in the same millisecond would otherwise share a key
/// and the second would silently replace the first.
#[derive(Debug, Default)]
pub struct VersionClock {
    last: AtomicI64,
}

impl VersionClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time in milliseconds, bumped past the previously issued value if needed.
    pub fn next(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}
