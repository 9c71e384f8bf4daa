//! Session cooldown state machine.
//!
//! A cooldown is a session-level penalty box, distinct from per-message
//! rate limiting: it is entered either explicitly (the host decides a
//! session needs a timeout) or automatically when the trailing
//! rapid-message window fills up. Expiry is evaluated lazily — any status
//! read past the deadline clears the penalty as a side effect, so a
//! session is never reported as penalized after its cooldown has lapsed.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::CooldownConfig;
use crate::limiter::secs_ceil;
use crate::store::SessionStore;

/// Which gate produced a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CooldownType {
    /// Per-message rate limiting (pacing, volume cap, burst).
    Message,
    /// Session-level cooldown penalty.
    Session,
    /// No penalty; the message may proceed.
    None,
}

/// Composite verdict returned to the message-submission handler.
#[derive(Debug, Clone, Serialize)]
pub struct CooldownResult {
    /// Whether the session may send right now.
    pub can_send: bool,
    /// Seconds until the gate opens again (0 when allowed).
    pub remaining_secs: u64,
    /// Human-readable denial reason, absent when allowed.
    pub reason: Option<String>,
    /// Which gate denied, or [`CooldownType::None`] when allowed.
    pub cooldown_type: CooldownType,
}

impl CooldownResult {
    /// An allowed verdict.
    pub fn allowed() -> Self {
        Self {
            can_send: true,
            remaining_secs: 0,
            reason: None,
            cooldown_type: CooldownType::None,
        }
    }

    pub(crate) fn denied(cooldown_type: CooldownType, remaining_secs: u64, reason: String) -> Self {
        Self {
            can_send: false,
            remaining_secs,
            reason: Some(reason),
            cooldown_type,
        }
    }
}

/// Tracks cooldown penalties and the rapid-message trigger over the shared store.
#[derive(Debug)]
pub struct CooldownTracker {
    store: Arc<SessionStore>,
    config: CooldownConfig,
}

impl CooldownTracker {
    /// Create a tracker over the given store.
    pub fn new(store: Arc<SessionStore>, config: CooldownConfig) -> Self {
        Self { store, config }
    }

    /// Report the session's cooldown status, clearing an expired penalty as
    /// a side effect of the read.
    pub fn check(&self, session_id: &str) -> CooldownResult {
        self.store.with_session(session_id, |record| {
            let now = Instant::now();
            match record.cooldown_until {
                Some(until) if until > now => CooldownResult::denied(
                    CooldownType::Session,
                    secs_ceil(until - now),
                    "session is cooling down".to_string(),
                ),
                Some(_) => {
                    record.cooldown_until = None;
                    debug!(session = %session_id, "Cooldown lapsed; session active again");
                    CooldownResult::allowed()
                }
                None => CooldownResult::allowed(),
            }
        })
    }

    /// Put the session into cooldown for `duration`, replacing any shorter
    /// penalty already running.
    pub fn start(&self, session_id: &str, duration: Duration) {
        self.store.with_session(session_id, |record| {
            record.cooldown_until = Some(Instant::now() + duration);
        });
        debug!(session = %session_id, secs = duration.as_secs(), "Cooldown started");
    }

    /// Feed an accepted message into the rapid-message window. When the
    /// trailing window reaches the configured threshold, the session enters
    /// cooldown and the denial is returned; otherwise `None`.
    pub fn observe_message(&self, session_id: &str) -> Option<CooldownResult> {
        let window = Duration::from_secs(self.config.rapid_window_secs);
        let duration = Duration::from_secs(self.config.cooldown_duration_secs);

        self.store.with_session(session_id, |record| {
            let now = Instant::now();
            record.rapid_timestamps.push_back(now);
            record.prune_rapid(now, window);

            if record.rapid_timestamps.len() < self.config.rapid_message_threshold {
                return None;
            }

            record.cooldown_until = Some(now + duration);
            record.rapid_timestamps.clear();
            warn!(
                session = %session_id,
                threshold = self.config.rapid_message_threshold,
                cooldown_secs = self.config.cooldown_duration_secs,
                "Rapid messaging detected; session placed in cooldown"
            );
            Some(CooldownResult::denied(
                CooldownType::Session,
                secs_ceil(duration),
                "rapid messaging detected".to_string(),
            ))
        })
    }

    /// Administrative transition back to active: clears both penalties,
    /// zeroes every counter, and restarts the session age.
    pub fn reset(&self, session_id: &str) {
        self.store.with_session(session_id, |record| {
            record.reset(Instant::now());
        });
        debug!(session = %session_id, "Session reset by administrator");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(config: CooldownConfig) -> CooldownTracker {
        let store = Arc::new(SessionStore::new(Duration::from_secs(3600)));
        CooldownTracker::new(store, config)
    }

    #[test]
    fn test_fresh_session_is_active() {
        let tracker = tracker(CooldownConfig::default());
        let status = tracker.check("s1");
        assert!(status.can_send);
        assert_eq!(status.cooldown_type, CooldownType::None);
        assert_eq!(status.remaining_secs, 0);
    }

    #[test]
    fn test_started_cooldown_denies_with_remaining_time() {
        let tracker = tracker(CooldownConfig::default());
        tracker.start("s1", Duration::from_secs(30));

        let status = tracker.check("s1");
        assert!(!status.can_send);
        assert_eq!(status.cooldown_type, CooldownType::Session);
        assert!(status.remaining_secs > 0 && status.remaining_secs <= 30);
        assert!(status.reason.is_some());
    }

    #[test]
    fn test_expired_cooldown_clears_on_read() {
        let tracker = tracker(CooldownConfig::default());
        tracker.start("s1", Duration::from_millis(20));
        std::thread::sleep(Duration::from_millis(40));

        let status = tracker.check("s1");
        assert!(status.can_send);

        // The read cleared the penalty, not just reported it expired.
        let cleared = tracker.store.peek("s1", |r| r.cooldown_until.is_none()).expect("record");
        assert!(cleared);
    }

    #[test]
    fn test_rapid_window_triggers_cooldown() {
        let tracker = tracker(CooldownConfig {
            rapid_message_threshold: 3,
            ..CooldownConfig::default()
        });
        assert!(tracker.observe_message("s1").is_none());
        assert!(tracker.observe_message("s1").is_none());

        let denied = tracker.observe_message("s1").expect("threshold reached");
        assert!(!denied.can_send);
        assert_eq!(denied.cooldown_type, CooldownType::Session);
        assert_eq!(denied.remaining_secs, 30);

        assert!(!tracker.check("s1").can_send);
    }

    #[test]
    fn test_reset_returns_session_to_active() {
        let tracker = tracker(CooldownConfig {
            rapid_message_threshold: 2,
            ..CooldownConfig::default()
        });
        tracker.observe_message("s1");
        tracker.observe_message("s1");
        assert!(!tracker.check("s1").can_send);

        tracker.reset("s1");
        assert!(tracker.check("s1").can_send);
        let empty = tracker.store.peek("s1", |r| r.rapid_timestamps.is_empty()).expect("record");
        assert!(empty);
    }

    #[test]
    fn test_observe_counts_only_recent_messages() {
        let tracker = tracker(CooldownConfig {
            rapid_message_threshold: 3,
            rapid_window_secs: 1,
            ..CooldownConfig::default()
        });
        tracker.observe_message("s1");
        tracker.observe_message("s1");
        std::thread::sleep(Duration::from_millis(1100));

        // The earlier messages aged out of the window.
        assert!(tracker.observe_message("s1").is_none());
    }
}
