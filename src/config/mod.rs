//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Top-level config struct, TOML file loading, and the session-store section
//! - [`limits`]: Pacing and penalty configuration (RateLimitConfig, CooldownConfig)
//! - [`signals`]: Form and client-signal configuration (HoneypotConfig, FingerprintConfig)

mod limits;
mod signals;
mod types;

pub use limits::{CooldownConfig, RateLimitConfig};
pub use signals::{FingerprintConfig, HoneypotConfig};
pub use types::{ConfigError, GuardConfig, StoreConfig};
