//! Form and client-signal configuration.

use serde::Deserialize;

/// Honeypot tripwire configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HoneypotConfig {
    /// How many decoy fields a render samples from the catalog (default: 3).
    #[serde(default = "default_rendered_fields")]
    pub rendered_fields: usize,
    /// Distinct filled decoys above which the verdict is forced to bot
    /// regardless of per-field score (default: 3).
    #[serde(default = "default_max_filled")]
    pub max_filled_fields: usize,
    /// Risk score above which a submission is classified as a bot (default: 0.5).
    #[serde(default = "default_bot_threshold")]
    pub bot_threshold: f32,
}

impl Default for HoneypotConfig {
    fn default() -> Self {
        Self {
            rendered_fields: default_rendered_fields(),
            max_filled_fields: default_max_filled(),
            bot_threshold: default_bot_threshold(),
        }
    }
}

fn default_rendered_fields() -> usize {
    3
}

fn default_max_filled() -> usize {
    3
}

fn default_bot_threshold() -> f32 {
    0.5
}

/// Client fingerprint scoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FingerprintConfig {
    /// Extra user-agent patterns flagged as automation, as regexes.
    /// These supplement the built-in marker list; invalid patterns are
    /// skipped with a warning.
    #[serde(default)]
    pub bot_ua_patterns: Vec<String>,
    /// Risk score above which a fingerprint is flagged suspicious (default: 0.5).
    #[serde(default = "default_suspicion_threshold")]
    pub suspicion_threshold: f32,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            bot_ua_patterns: Vec::new(),
            suspicion_threshold: default_suspicion_threshold(),
        }
    }
}

fn default_suspicion_threshold() -> f32 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rendered_fields_value() {
        assert_eq!(default_rendered_fields(), 3);
    }

    #[test]
    fn default_max_filled_value() {
        assert_eq!(default_max_filled(), 3);
    }

    #[test]
    fn default_bot_threshold_value() {
        assert!((default_bot_threshold() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn honeypot_config_default_values() {
        let config = HoneypotConfig::default();
        assert_eq!(config.rendered_fields, 3);
        assert_eq!(config.max_filled_fields, 3);
        assert!((config.bot_threshold - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn fingerprint_config_default_values() {
        let config = FingerprintConfig::default();
        assert!(config.bot_ua_patterns.is_empty());
        assert!((config.suspicion_threshold - 0.5).abs() < f32::EPSILON);
    }
}
