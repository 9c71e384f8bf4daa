//! Pacing and penalty configuration.

use serde::Deserialize;

/// Rate limiting configuration for per-message pacing and volume caps.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Minimum spacing between accepted messages in milliseconds (default: 1000).
    #[serde(default = "default_min_interval_ms")]
    pub min_message_interval_ms: u64,
    /// Messages allowed inside the counting window before a block (default: 10).
    #[serde(default = "default_max_per_minute")]
    pub max_messages_per_minute: u32,
    /// Length of the per-minute counting window in seconds (default: 60).
    /// The window is anchored on the previous accepted message; a longer gap
    /// resets the counter.
    #[serde(default = "default_minute_window")]
    pub minute_window_secs: u64,
    /// Messages allowed inside the trailing one-second burst window (default: 2).
    #[serde(default = "default_max_per_second")]
    pub max_messages_per_second: u32,
    /// How long a volume-cap block lasts in seconds (default: 60).
    #[serde(default = "default_block_duration")]
    pub block_duration_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_message_interval_ms: default_min_interval_ms(),
            max_messages_per_minute: default_max_per_minute(),
            minute_window_secs: default_minute_window(),
            max_messages_per_second: default_max_per_second(),
            block_duration_secs: default_block_duration(),
        }
    }
}

fn default_min_interval_ms() -> u64 {
    1000
}

fn default_max_per_minute() -> u32 {
    10
}

fn default_minute_window() -> u64 {
    60
}

fn default_max_per_second() -> u32 {
    2
}

fn default_block_duration() -> u64 {
    60
}

/// Cooldown penalty-box configuration.
///
/// The cooldown is a session-level penalty distinct from per-message rate
/// limiting; it is triggered by sustained rapid messaging or started
/// explicitly by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct CooldownConfig {
    /// Messages inside the rapid window that trigger a cooldown (default: 10).
    #[serde(default = "default_rapid_threshold")]
    pub rapid_message_threshold: usize,
    /// Length of the trailing rapid-message window in seconds (default: 10).
    #[serde(default = "default_rapid_window")]
    pub rapid_window_secs: u64,
    /// Duration of a triggered cooldown in seconds (default: 30).
    #[serde(default = "default_cooldown_duration")]
    pub cooldown_duration_secs: u64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            rapid_message_threshold: default_rapid_threshold(),
            rapid_window_secs: default_rapid_window(),
            cooldown_duration_secs: default_cooldown_duration(),
        }
    }
}

fn default_rapid_threshold() -> usize {
    10
}

fn default_rapid_window() -> u64 {
    10
}

fn default_cooldown_duration() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_min_interval_value() {
        assert_eq!(default_min_interval_ms(), 1000);
    }

    #[test]
    fn default_max_per_minute_value() {
        assert_eq!(default_max_per_minute(), 10);
    }

    #[test]
    fn default_minute_window_value() {
        assert_eq!(default_minute_window(), 60);
    }

    #[test]
    fn default_max_per_second_value() {
        assert_eq!(default_max_per_second(), 2);
    }

    #[test]
    fn default_block_duration_value() {
        assert_eq!(default_block_duration(), 60);
    }

    #[test]
    fn rate_limit_config_default_values() {
        let config = RateLimitConfig::default();
        assert_eq!(config.min_message_interval_ms, 1000);
        assert_eq!(config.max_messages_per_minute, 10);
        assert_eq!(config.minute_window_secs, 60);
        assert_eq!(config.max_messages_per_second, 2);
        assert_eq!(config.block_duration_secs, 60);
    }

    #[test]
    fn cooldown_config_default_values() {
        let config = CooldownConfig::default();
        assert_eq!(config.rapid_message_threshold, 10);
        assert_eq!(config.rapid_window_secs, 10);
        assert_eq!(config.cooldown_duration_secs, 30);
    }
}
