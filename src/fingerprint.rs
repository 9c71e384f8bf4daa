//! Client fingerprint collection and heuristic risk scoring.
//!
//! A fingerprint is a best-effort descriptor of the client environment,
//! assembled from caller-supplied attributes. Collection never fails:
//! when the execution context cannot supply client attributes at all, the
//! fingerprint is tagged [`FingerprintOrigin::Degraded`] and scoring biases
//! toward scrutiny rather than erroring out.
//!
//! Scoring is pure and stateless per call; comparison supports detecting a
//! returning session that presents an inconsistent descriptor.

use aho_corasick::AhoCorasick;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::FingerprintConfig;

/// Placeholder for attributes the client did not report.
const UNKNOWN: &str = "unknown";

/// User-agent substrings indicating automation tooling.
const BOT_UA_MARKERS: &[&str] = &[
    "bot",
    "crawler",
    "spider",
    "scraper",
    "headless",
    "phantomjs",
    "selenium",
    "puppeteer",
    "playwright",
    "curl",
    "wget",
    "python-requests",
    "go-http-client",
    "java/",
    "scrapy",
];

// Additive risk increments, clamped to 1.0 after summing.
const UA_MARKER_WEIGHT: f32 = 0.4;
const DEGRADED_WEIGHT: f32 = 0.3;
const RESOLUTION_SENTINEL_WEIGHT: f32 = 0.3;
const LOW_CONCURRENCY_WEIGHT: f32 = 0.2;
const COOKIES_DISABLED_WEIGHT: f32 = 0.1;
const DNT_WEIGHT: f32 = 0.1;
const PIXEL_RATIO_WEIGHT: f32 = 0.2;
const COLOR_DEPTH_WEIGHT: f32 = 0.2;
const TOUCH_POINTS_WEIGHT: f32 = 0.2;

/// Two fingerprints sharing more than this fraction of core attributes are
/// treated as the same client.
const SAME_CLIENT_THRESHOLD: f32 = 0.8;

/// Where a fingerprint's attributes came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintOrigin {
    /// Assembled from a client-supplied attribute report.
    Client,
    /// The execution context could not supply client attributes; every
    /// field holds an explicit fallback.
    Degraded,
}

/// Raw client-reported attributes, every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientAttributes {
    pub user_agent: Option<String>,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub screen_resolution: Option<String>,
    pub platform: Option<String>,
    pub cookie_enabled: Option<bool>,
    pub do_not_track: Option<bool>,
    pub color_depth: Option<u32>,
    pub pixel_ratio: Option<f32>,
    pub hardware_concurrency: Option<u32>,
    pub max_touch_points: Option<u32>,
}

/// A collected client descriptor. Never mutated; a fresh collection
/// replaces the previous fingerprint outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Correlates the fingerprint with a chat session.
    pub session_id: String,
    /// Wall-clock collection time.
    pub collected_at: DateTime<Utc>,
    /// Whether real client attributes backed this collection.
    pub origin: FingerprintOrigin,
    pub user_agent: String,
    pub language: String,
    pub timezone: String,
    pub screen_resolution: String,
    pub platform: String,
    pub cookie_enabled: bool,
    pub do_not_track: bool,
    pub color_depth: u32,
    pub pixel_ratio: f32,
    pub hardware_concurrency: u32,
    pub max_touch_points: u32,
}

impl Fingerprint {
    /// SHA-256 hex digest over the core attributes, suitable for client-side
    /// caching of `hash + raw fields`. Correlation fields (session id,
    /// collection time) are excluded so the digest identifies the client
    /// environment, not the session.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();
        for part in [
            &self.user_agent,
            &self.language,
            &self.timezone,
            &self.screen_resolution,
            &self.platform,
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([u8::from(self.cookie_enabled), u8::from(self.do_not_track)]);
        hasher.update(self.color_depth.to_le_bytes());
        hasher.update(self.pixel_ratio.to_le_bytes());
        hasher.update(self.hardware_concurrency.to_le_bytes());
        hasher.update(self.max_touch_points.to_le_bytes());

        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }
}

/// Heuristic bot-risk verdict for one fingerprint.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    /// Accumulated risk in [0, 1].
    pub risk_score: f32,
    /// Whether the score crossed the suspicion threshold.
    pub is_suspicious: bool,
    /// Human-readable contributing signals.
    pub reasons: Vec<String>,
}

/// Result of comparing two fingerprints for session continuity.
#[derive(Debug, Clone, Serialize)]
pub struct FingerprintComparison {
    /// Fraction of core attributes that match, in [0, 1].
    pub similarity: f32,
    /// Whether the two descriptors plausibly belong to the same client.
    pub is_same: bool,
    /// Names of the core attributes that differ.
    pub differences: Vec<String>,
}

/// Collects fingerprints and scores them for automation likelihood.
#[derive(Debug)]
pub struct FingerprintEngine {
    bot_markers: AhoCorasick,
    extra_patterns: Vec<Regex>,
    suspicion_threshold: f32,
}

impl FingerprintEngine {
    /// Build an engine from configuration. Invalid extra patterns are
    /// skipped with a warning rather than failing construction.
    pub fn new(config: &FingerprintConfig) -> Self {
        let bot_markers = match AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(BOT_UA_MARKERS)
        {
            Ok(matcher) => matcher,
            Err(err) => {
                warn!(error = ?err, "Failed to build user-agent marker matcher; marker matching disabled");
                let empty: Vec<String> = Vec::new();
                AhoCorasick::builder()
                    .ascii_case_insensitive(true)
                    .build(&empty)
                    .expect("building empty Aho-Corasick should not fail")
            }
        };

        let extra_patterns = config
            .bot_ua_patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!(pattern = %pattern, error = %err, "Skipping invalid bot user-agent pattern");
                    None
                }
            })
            .collect();

        Self {
            bot_markers,
            extra_patterns,
            suspicion_threshold: config.suspicion_threshold,
        }
    }

    /// Assemble a fingerprint for the session. Never fails: a missing
    /// attribute report yields a degraded fingerprint with explicit
    /// fallbacks, and individually omitted attributes are defaulted.
    pub fn collect(&self, session_id: &str, attrs: Option<&ClientAttributes>) -> Fingerprint {
        let collected_at = Utc::now();
        match attrs {
            Some(a) => Fingerprint {
                session_id: session_id.to_string(),
                collected_at,
                origin: FingerprintOrigin::Client,
                user_agent: a.user_agent.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                language: a.language.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                timezone: a.timezone.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                screen_resolution: a
                    .screen_resolution
                    .clone()
                    .unwrap_or_else(|| UNKNOWN.to_string()),
                platform: a.platform.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                cookie_enabled: a.cookie_enabled.unwrap_or(true),
                do_not_track: a.do_not_track.unwrap_or(false),
                color_depth: a.color_depth.unwrap_or(24),
                pixel_ratio: a.pixel_ratio.unwrap_or(1.0),
                hardware_concurrency: a.hardware_concurrency.unwrap_or(4),
                max_touch_points: a.max_touch_points.unwrap_or(0),
            },
            None => Fingerprint {
                session_id: session_id.to_string(),
                collected_at,
                origin: FingerprintOrigin::Degraded,
                user_agent: UNKNOWN.to_string(),
                language: UNKNOWN.to_string(),
                timezone: UNKNOWN.to_string(),
                screen_resolution: UNKNOWN.to_string(),
                platform: UNKNOWN.to_string(),
                cookie_enabled: false,
                do_not_track: false,
                color_depth: 0,
                pixel_ratio: 0.0,
                hardware_concurrency: 0,
                max_touch_points: 0,
            },
        }
    }

    /// Score a fingerprint for automation likelihood. Pure; no state is
    /// read or written.
    pub fn score(&self, fp: &Fingerprint) -> RiskAssessment {
        let mut score = 0.0f32;
        let mut reasons = Vec::new();

        if self.matches_bot_agent(&fp.user_agent) {
            score += UA_MARKER_WEIGHT;
            reasons.push("user agent matches an automation marker".to_string());
        }
        if fp.origin == FingerprintOrigin::Degraded {
            score += DEGRADED_WEIGHT;
            reasons.push("collected without client context".to_string());
        }
        if fp.screen_resolution == "0x0" || fp.screen_resolution == UNKNOWN {
            score += RESOLUTION_SENTINEL_WEIGHT;
            reasons.push("screen resolution unavailable".to_string());
        }
        if fp.hardware_concurrency < 2 {
            score += LOW_CONCURRENCY_WEIGHT;
            reasons.push("implausibly low hardware concurrency".to_string());
        }
        if !fp.cookie_enabled {
            score += COOKIES_DISABLED_WEIGHT;
            reasons.push("cookies disabled".to_string());
        }
        if fp.do_not_track {
            score += DNT_WEIGHT;
            reasons.push("do-not-track enabled".to_string());
        }
        if fp.pixel_ratio > 3.0 {
            score += PIXEL_RATIO_WEIGHT;
            reasons.push("unusual pixel ratio".to_string());
        }
        if fp.color_depth < 16 {
            score += COLOR_DEPTH_WEIGHT;
            reasons.push("low color depth".to_string());
        }
        if fp.max_touch_points > 10 {
            score += TOUCH_POINTS_WEIGHT;
            reasons.push("implausible touch point count".to_string());
        }

        let risk_score = score.min(1.0);
        RiskAssessment {
            risk_score,
            is_suspicious: risk_score > self.suspicion_threshold,
            reasons,
        }
    }

    /// Compare two fingerprints across the core attributes, equal-weighted.
    /// Symmetric: argument order does not affect the similarity.
    pub fn compare(&self, a: &Fingerprint, b: &Fingerprint) -> FingerprintComparison {
        let checks = [
            ("user_agent", a.user_agent == b.user_agent),
            ("language", a.language == b.language),
            ("timezone", a.timezone == b.timezone),
            ("screen_resolution", a.screen_resolution == b.screen_resolution),
            ("platform", a.platform == b.platform),
            ("cookie_enabled", a.cookie_enabled == b.cookie_enabled),
            ("color_depth", a.color_depth == b.color_depth),
            ("hardware_concurrency", a.hardware_concurrency == b.hardware_concurrency),
        ];

        let matching = checks.iter().filter(|(_, same)| *same).count();
        let differences: Vec<String> = checks
            .iter()
            .filter(|(_, same)| !*same)
            .map(|(name, _)| name.to_string())
            .collect();

        let similarity = matching as f32 / checks.len() as f32;
        FingerprintComparison {
            similarity,
            is_same: similarity > SAME_CLIENT_THRESHOLD,
            differences,
        }
    }

    fn matches_bot_agent(&self, user_agent: &str) -> bool {
        if self.bot_markers.find(user_agent).is_some() {
            return true;
        }
        self.extra_patterns.iter().any(|re| re.is_match(user_agent))
    }
}
