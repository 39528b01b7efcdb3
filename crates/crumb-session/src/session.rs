//! A single session's field map and idle clock.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

/// State guarded by the session lock.
#[derive(Debug)]
struct SessionState {
    values: HashMap<String, String>,
    accessed: Instant,
}

/// One client's key/value bag.
///
/// Every access goes through the session's own lock, so unrelated
/// sessions never contend with each other. Both `get` and `set` refresh
/// the last-access time.
#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty session, accessed now.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState {
                values: HashMap::new(),
                accessed: Instant::now(),
            }),
        }
    }

    /// Look up a field. Hit or miss, this counts as an access.
    pub fn get(&self, key: &str) -> Option<String> {
        let mut state = self.state.lock();
        state.accessed = Instant::now();
        state.values.get(key).cloned()
    }

    /// Insert or overwrite a field.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        let mut state = self.state.lock();
        state.values.insert(key.into(), value.into());
        state.accessed = Instant::now();
    }

    /// Mark the session accessed now without touching its fields.
    pub fn touch(&self) {
        self.state.lock().accessed = Instant::now();
    }

    /// When the session was last read or written.
    pub fn last_accessed(&self) -> Instant {
        self.state.lock().accessed
    }

    /// Whether the session has been idle longer than `ttl` as of `now`.
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        let accessed = self.last_accessed();
        now.checked_duration_since(accessed)
            .is_some_and(|idle| idle > ttl)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.state.lock().values.len()
    }

    /// Whether the session holds no fields.
    pub fn is_empty(&self) -> bool {
        self.state.lock().values.is_empty()
    }

    /// Field names, unordered.
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().values.keys().cloned().collect()
    }
}
