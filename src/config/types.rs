//! Top-level configuration type and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::limits::{CooldownConfig, RateLimitConfig};
use super::signals::{FingerprintConfig, HoneypotConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Guard configuration.
///
/// Every section has working defaults; an empty file (or [`GuardConfig::default`])
/// yields the stock policy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GuardConfig {
    /// Per-message pacing and volume caps.
    #[serde(default)]
    pub rate: RateLimitConfig,
    /// Cooldown penalty-box behavior.
    #[serde(default)]
    pub cooldown: CooldownConfig,
    /// Honeypot form tripwires.
    #[serde(default)]
    pub honeypot: HoneypotConfig,
    /// Client fingerprint scoring.
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
    /// Session store retention and sweeping.
    #[serde(default)]
    pub store: StoreConfig,
}

impl GuardConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: GuardConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Session store retention and sweep configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Seconds of inactivity before a session record is evicted (default: 3600).
    #[serde(default = "default_retention")]
    pub retention_secs: u64,
    /// Interval between eviction sweeps in seconds (default: 300).
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

fn default_retention() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    300
}
