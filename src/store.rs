//! Shared session store for abuse-tracking state.
//!
//! One [`SessionRecord`] per opaque session id, held in a concurrent map.
//! Every evaluate-then-mutate sequence on a record runs under the map's
//! entry guard, so operations on the same key are atomic while different
//! keys proceed in parallel.
//!
//! Penalties carry their own expiry and are cleared lazily at read time;
//! a periodic sweep evicts records with no recent activity.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

/// Per-session abuse-tracking state.
///
/// Owned exclusively by [`SessionStore`]; components mutate it only through
/// [`SessionStore::with_session`].
#[derive(Debug)]
pub struct SessionRecord {
    /// When the record was first created (restarted by an administrative reset).
    pub started_at: Instant,
    /// Last access of any kind; drives eviction.
    pub last_seen_at: Instant,
    /// Most recently accepted message, if any.
    pub last_message_at: Option<Instant>,
    /// Messages accepted in the current per-minute counting window.
    pub minute_count: u32,
    /// Messages accepted in the trailing one-second burst window.
    pub second_count: u32,
    /// Timestamps of recent accepted messages for the rapid-message trigger.
    pub rapid_timestamps: VecDeque<Instant>,
    /// Active cooldown penalty, cleared lazily once expired.
    pub cooldown_until: Option<Instant>,
    /// Active volume-cap block, independent of cooldown, same lazy expiry.
    pub blocked_until: Option<Instant>,
}

impl SessionRecord {
    fn new(now: Instant) -> Self {
        Self {
            started_at: now,
            last_seen_at: now,
            last_message_at: None,
            minute_count: 0,
            second_count: 0,
            rapid_timestamps: VecDeque::new(),
            cooldown_until: None,
            blocked_until: None,
        }
    }

    /// Whether a cooldown is active at `now`. Does not clear expired state.
    pub fn in_cooldown(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| until > now)
    }

    /// Whether a volume-cap block is active at `now`. Does not clear expired state.
    pub fn is_blocked(&self, now: Instant) -> bool {
        self.blocked_until.is_some_and(|until| until > now)
    }

    /// Drop rapid-window timestamps older than `window`.
    pub fn prune_rapid(&mut self, now: Instant, window: Duration) {
        let Some(cutoff) = now.checked_sub(window) else {
            return;
        };
        while let Some(&t) = self.rapid_timestamps.front() {
            if t < cutoff {
                self.rapid_timestamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Administrative reset: clear both penalties, zero every counter, and
    /// restart the session age.
    pub fn reset(&mut self, now: Instant) {
        self.started_at = now;
        self.last_message_at = None;
        self.minute_count = 0;
        self.second_count = 0;
        self.rapid_timestamps.clear();
        self.cooldown_until = None;
        self.blocked_until = None;
    }
}

/// Concurrent map of session records with activity-based eviction.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, SessionRecord>,
    retention: Duration,
}

impl SessionStore {
    /// Create an empty store. Records untouched for `retention` are eligible
    /// for eviction by [`SessionStore::sweep`].
    pub fn new(retention: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            retention,
        }
    }

    /// Run `f` against the session's record, creating a zero-state record on
    /// first touch. The closure executes under the entry guard, so it is
    /// atomic with respect to every other operation on the same key.
    pub fn with_session<T>(&self, session_id: &str, f: impl FnOnce(&mut SessionRecord) -> T) -> T {
        let now = Instant::now();
        let mut entry = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRecord::new(now));
        entry.last_seen_at = now;
        f(entry.value_mut())
    }

    /// Read-only access to an existing record. Returns `None` for unknown
    /// sessions and does not create one.
    pub fn peek<T>(&self, session_id: &str, f: impl FnOnce(&SessionRecord) -> T) -> Option<T> {
        self.sessions.get(session_id).map(|entry| f(entry.value()))
    }

    /// Remove a single session's record.
    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Drop every record.
    pub fn clear(&self) {
        self.sessions.clear();
    }

    /// Number of tracked sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions with an active cooldown at `now`.
    pub fn cooldown_count(&self, now: Instant) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().in_cooldown(now))
            .count()
    }

    /// Evict records whose last activity is older than the retention window.
    ///
    /// Called periodically by the sweeper task; uses the same per-key locking
    /// as normal access, so it cannot race an in-flight evaluation.
    pub fn sweep(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, record| now.saturating_duration_since(record.last_seen_at) < self.retention);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = self.sessions.len(), "Stale sessions evicted");
        }
        evicted
    }
}
