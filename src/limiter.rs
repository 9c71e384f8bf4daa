//! Per-message rate limiting.
//!
//! Enforces, in order of precedence:
//! - An active volume-cap block (checked before any counter logic)
//! - Minimum spacing between consecutive messages
//! - A per-minute message cap that escalates into a timed block
//! - A trailing one-second burst cap
//!
//! All decisions run as a single atomic section on the session's record;
//! a denial never advances a counter, so probing while limited cannot
//! extend the penalty.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RateLimitConfig;
use crate::store::SessionStore;

/// The burst cap counts messages inside this trailing window.
const BURST_WINDOW: Duration = Duration::from_secs(1);

/// Verdict for a single inbound message.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitResult {
    /// Whether the message may proceed.
    pub allowed: bool,
    /// Seconds the caller should wait before retrying (0 when allowed).
    pub retry_after_secs: u64,
    /// Messages left in the current counting window (0 when denied).
    pub remaining_messages: u32,
    /// Human-readable denial reason, absent when allowed.
    pub reason: Option<String>,
}

impl RateLimitResult {
    fn allowed(remaining_messages: u32) -> Self {
        Self {
            allowed: true,
            retry_after_secs: 0,
            remaining_messages,
            reason: None,
        }
    }

    fn denied(retry_after_secs: u64, reason: &str) -> Self {
        Self {
            allowed: false,
            retry_after_secs,
            remaining_messages: 0,
            reason: Some(reason.to_string()),
        }
    }
}

/// Round a duration up to whole seconds for retry hints.
pub(crate) fn secs_ceil(d: Duration) -> u64 {
    d.as_millis().div_ceil(1000) as u64
}

/// Pacing and volume guard over the shared session store.
#[derive(Debug)]
pub struct RateLimiter {
    store: Arc<SessionStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    /// Create a limiter over the given store.
    pub fn new(store: Arc<SessionStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    /// Evaluate an inbound message, committing it to the session's counters
    /// when every guard passes. Call once per message, before processing it.
    pub fn evaluate(&self, session_id: &str) -> RateLimitResult {
        let min_interval = Duration::from_millis(self.config.min_message_interval_ms);
        let minute_window = Duration::from_secs(self.config.minute_window_secs);
        let block_duration = Duration::from_secs(self.config.block_duration_secs);

        self.store.with_session(session_id, |record| {
            let now = Instant::now();

            // An active block wins over every counter.
            if let Some(until) = record.blocked_until {
                if now < until {
                    let retry = secs_ceil(until - now);
                    debug!(session = %session_id, retry_after = retry, "Message denied: volume block active");
                    return RateLimitResult::denied(retry, "session temporarily blocked for excessive volume");
                }
                // Block lapsed: clear it and start a fresh counting window.
                record.blocked_until = None;
                record.minute_count = 0;
            }

            if let Some(last) = record.last_message_at {
                let elapsed = now.saturating_duration_since(last);

                if elapsed < min_interval {
                    let retry = secs_ceil(min_interval - elapsed);
                    debug!(session = %session_id, retry_after = retry, "Message denied: below minimum interval");
                    return RateLimitResult::denied(retry, "messages arriving too quickly");
                }

                if elapsed < minute_window {
                    if record.minute_count >= self.config.max_messages_per_minute {
                        record.blocked_until = Some(now + block_duration);
                        warn!(
                            session = %session_id,
                            count = record.minute_count,
                            block_secs = self.config.block_duration_secs,
                            "Message volume cap reached; session blocked"
                        );
                        return RateLimitResult::denied(
                            secs_ceil(block_duration),
                            "message volume cap reached",
                        );
                    }
                } else {
                    record.minute_count = 0;
                }

                if elapsed < BURST_WINDOW {
                    if record.second_count >= self.config.max_messages_per_second {
                        debug!(session = %session_id, "Message denied: burst cap reached");
                        return RateLimitResult::denied(1, "too many messages this second");
                    }
                } else {
                    record.second_count = 0;
                }
            }

            record.minute_count += 1;
            record.second_count += 1;
            record.last_message_at = Some(now);

            let remaining = self
                .config
                .max_messages_per_minute
                .saturating_sub(record.minute_count);
            RateLimitResult::allowed(remaining)
        })
    }

    /// Bare bookkeeping path: commit a message to the session's counters
    /// without running the guards. For callers that accepted the message
    /// through some other gate (e.g. a form flow that only ran `inspect`).
    pub fn record(&self, session_id: &str) {
        let minute_window = Duration::from_secs(self.config.minute_window_secs);

        self.store.with_session(session_id, |record| {
            let now = Instant::now();
            if let Some(last) = record.last_message_at {
                let elapsed = now.saturating_duration_since(last);
                if elapsed >= minute_window {
                    record.minute_count = 0;
                }
                if elapsed >= BURST_WINDOW {
                    record.second_count = 0;
                }
            }
            record.minute_count += 1;
            record.second_count += 1;
            record.last_message_at = Some(now);
        });
    }
}
