//! chatwarden — session-based abuse mitigation for unauthenticated chat endpoints.
//!
//! Decides, per inbound message, whether a session may send — combining
//! inter-message pacing, volume caps, a cooldown penalty box, honeypot
//! form tripwires, and heuristic client-fingerprint scoring. Everything is
//! in-process and in-memory: the host web layer owns routing, rendering,
//! and transport, and calls in through [`AbuseGuard`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          AbuseGuard                             │
//! ├─────────────┬──────────────┬───────────────┬────────────────────┤
//! │  Cooldown   │ Rate Limiter │   Honeypot    │    Fingerprint     │
//! │ penalty box │ pacing+caps  │ decoy fields  │  risk heuristics   │
//! ├─────────────┴──────────────┼───────────────┴────────────────────┤
//! │  SessionStore (DashMap)    │            stateless               │
//! └────────────────────────────┴────────────────────────────────────┘
//! ```
//!
//! Per message, gates run cheapest-first and short-circuit: cooldown →
//! rate limiter → rapid-volume trigger. Honeypot and fingerprint checks
//! run independently on form submission and session bootstrap, feeding a
//! risk score the host may use to shorten cooldowns or add friction.
//!
//! Denials are data, not errors: every surface returns a verdict object
//! with a reason and a remaining-wait, and a degraded environment biases
//! toward scrutiny instead of failing.
//!
//! State is process-local and lost on restart; running several instances
//! multiplies every budget by the instance count.

pub mod config;
pub mod cooldown;
pub mod fingerprint;
pub mod guard;
pub mod honeypot;
pub mod limiter;
pub mod store;

pub use config::{
    ConfigError, CooldownConfig, FingerprintConfig, GuardConfig, HoneypotConfig, RateLimitConfig,
    StoreConfig,
};
pub use cooldown::{CooldownResult, CooldownTracker, CooldownType};
pub use fingerprint::{
    ClientAttributes, Fingerprint, FingerprintComparison, FingerprintEngine, FingerprintOrigin,
    RiskAssessment,
};
pub use guard::AbuseGuard;
pub use honeypot::{HoneypotField, HoneypotInspector, HoneypotResult, CATALOG};
pub use limiter::{RateLimitResult, RateLimiter};
pub use store::{SessionRecord, SessionStore};
