//! Decision orchestration.
//!
//! [`AbuseGuard`] owns the session store and composes the four signal
//! components into a single verdict for the chat message-submission
//! handler. Gates run cheapest and most-blocking first — cooldown, then
//! per-message rate limiting, then the rapid-volume trigger — and the
//! first denial short-circuits, so already-rejected traffic never mutates
//! the finer-grained counters behind it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::GuardConfig;
use crate::cooldown::{CooldownResult, CooldownTracker, CooldownType};
use crate::fingerprint::{
    ClientAttributes, Fingerprint, FingerprintComparison, FingerprintEngine, RiskAssessment,
};
use crate::honeypot::{HoneypotField, HoneypotInspector, HoneypotResult};
use crate::limiter::RateLimiter;
use crate::store::SessionStore;

/// Session-based abuse-mitigation engine.
///
/// One instance per process (or per test); all state is in-memory and
/// lost on restart. The host web layer calls [`AbuseGuard::decide`] per
/// inbound chat message and the form/fingerprint surfaces from its own
/// handlers.
pub struct AbuseGuard {
    store: Arc<SessionStore>,
    limiter: RateLimiter,
    cooldowns: CooldownTracker,
    honeypot: HoneypotInspector,
    fingerprints: FingerprintEngine,
    sweep_interval: Duration,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl AbuseGuard {
    /// Build a guard from configuration. The eviction sweeper is not
    /// running yet; call [`AbuseGuard::start_sweeper`] from within a tokio
    /// runtime once the host is ready.
    pub fn new(config: GuardConfig) -> Self {
        let store = Arc::new(SessionStore::new(Duration::from_secs(
            config.store.retention_secs,
        )));
        Self {
            limiter: RateLimiter::new(Arc::clone(&store), config.rate),
            cooldowns: CooldownTracker::new(Arc::clone(&store), config.cooldown),
            honeypot: HoneypotInspector::new(config.honeypot),
            fingerprints: FingerprintEngine::new(&config.fingerprint),
            sweep_interval: Duration::from_secs(config.store.sweep_interval_secs),
            sweeper: Mutex::new(None),
            store,
        }
    }

    /// Decide whether the session may send a message right now.
    ///
    /// Order: cooldown, rate limiter, rapid-volume trigger. The message is
    /// committed to the session's counters only when every gate passes.
    pub fn decide(&self, session_id: &str) -> CooldownResult {
        let cooldown = self.cooldowns.check(session_id);
        if !cooldown.can_send {
            return cooldown;
        }

        let rate = self.limiter.evaluate(session_id);
        if !rate.allowed {
            return CooldownResult::denied(
                CooldownType::Message,
                rate.retry_after_secs,
                rate.reason
                    .unwrap_or_else(|| "rate limit exceeded".to_string()),
            );
        }

        if let Some(denied) = self.cooldowns.observe_message(session_id) {
            return denied;
        }

        CooldownResult::allowed()
    }

    /// Bookkeeping for a message accepted through some other gate (for
    /// example a form flow that only ran [`AbuseGuard::inspect_form`]).
    /// Do not pair this with an allowed [`AbuseGuard::decide`] for the
    /// same message — `decide` already commits.
    pub fn record_message(&self, session_id: &str) {
        self.limiter.record(session_id);
    }

    /// Put a session into cooldown explicitly (e.g. after a honeypot trip
    /// or a spoofed-fingerprint detection).
    pub fn start_cooldown(&self, session_id: &str, duration: Duration) {
        self.cooldowns.start(session_id, duration);
    }

    /// Inspect submitted form data against the honeypot catalog.
    pub fn inspect_form(&self, form: &HashMap<String, String>) -> HoneypotResult {
        self.honeypot.inspect(form)
    }

    /// Strip honeypot fields from form data before it reaches business
    /// logic. Run on every submission path.
    pub fn clean_form(&self, form: &mut HashMap<String, String>) {
        self.honeypot.clean(form);
    }

    /// Sample the decoy fields for one form render.
    pub fn honeypot_fields(&self) -> Vec<&'static HoneypotField> {
        self.honeypot.sample_fields()
    }

    /// Assemble a fingerprint for the session from a client attribute
    /// report (or its absence).
    pub fn collect_fingerprint(
        &self,
        session_id: &str,
        attrs: Option<&ClientAttributes>,
    ) -> Fingerprint {
        self.fingerprints.collect(session_id, attrs)
    }

    /// Score a fingerprint for automation likelihood.
    pub fn score_fingerprint(&self, fp: &Fingerprint) -> RiskAssessment {
        self.fingerprints.score(fp)
    }

    /// Compare two fingerprints for session continuity.
    pub fn compare_fingerprints(
        &self,
        a: &Fingerprint,
        b: &Fingerprint,
    ) -> FingerprintComparison {
        self.fingerprints.compare(a, b)
    }

    /// Administrative: return the session to active and zero its counters.
    pub fn reset_session(&self, session_id: &str) {
        self.cooldowns.reset(session_id);
    }

    /// Administrative: drop every tracked session.
    pub fn clear_all_sessions(&self) {
        self.store.clear();
        info!("All session records cleared");
    }

    /// Number of sessions currently tracked.
    pub fn active_session_count(&self) -> usize {
        self.store.len()
    }

    /// Number of sessions currently in cooldown.
    pub fn cooldown_session_count(&self) -> usize {
        self.store.cooldown_count(Instant::now())
    }

    /// Start the periodic eviction sweep. Must be called from within a
    /// tokio runtime; a second call while the sweeper runs is a no-op.
    pub fn start_sweeper(&self) {
        let mut slot = self.sweeper.lock();
        if slot.is_some() {
            return;
        }

        let store = Arc::clone(&self.store);
        let interval = self.sweep_interval;
        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; skip it so the first
            // sweep happens one full interval after startup.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.sweep(Instant::now());
            }
        }));
        debug!(interval_secs = interval.as_secs(), "Session sweeper started");
    }

    /// Stop the eviction sweep, if running. Also happens on drop.
    pub fn stop_sweeper(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            debug!("Session sweeper stopped");
        }
    }
}

impl Drop for AbuseGuard {
    fn drop(&mut self) {
        self.stop_sweeper();
    }
}
