//! Form and fingerprint screening scenarios through the public API.

use std::collections::HashMap;
use std::time::Duration;

use chatwarden::{AbuseGuard, ClientAttributes, FingerprintOrigin, GuardConfig, CATALOG};

fn form(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn browser_attrs() -> ClientAttributes {
    ClientAttributes {
        user_agent: Some("Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) Safari/605.1.15".into()),
        language: Some("pt-PT".into()),
        timezone: Some("Europe/Lisbon".into()),
        screen_resolution: Some("1512x982".into()),
        platform: Some("MacIntel".into()),
        cookie_enabled: Some(true),
        do_not_track: Some(false),
        color_depth: Some(30),
        pixel_ratio: Some(2.0),
        hardware_concurrency: Some(10),
        max_touch_points: Some(0),
    }
}

#[test]
fn contact_form_with_single_url_decoy_fill() {
    let guard = AbuseGuard::new(GuardConfig::default());
    let result = guard.inspect_form(&form(&[
        ("name", "Rui"),
        ("message", "Olá, tenho uma pergunta sobre o serviço."),
        ("website", "http://spam.biz"),
    ]));

    assert_eq!(result.detected_fields, vec!["website"]);
    // A lone plausible fill stays under the bot threshold by design.
    assert!(!result.is_bot);
    assert!(result.risk_score > 0.0 && result.risk_score < 0.5);
}

#[test]
fn placeholder_value_in_decoy_is_a_bot() {
    let guard = AbuseGuard::new(GuardConfig::default());
    let result = guard.inspect_form(&form(&[("email_confirmation", "test@test.com")]));

    assert!(result.is_bot);
    assert!(result.risk_score >= 0.8);
}

#[test]
fn greedy_form_filler_is_conclusive() {
    let guard = AbuseGuard::new(GuardConfig::default());
    let result = guard.inspect_form(&form(&[
        ("website", "https://legit-looking.example"),
        ("company", "Genuine Corp"),
        ("middle_name", "Maria"),
        ("fax_number", "+351 21 000 0000"),
    ]));

    assert!(result.is_bot);
    assert_eq!(result.risk_score, 1.0);
    assert_eq!(result.detected_fields.len(), 4);
}

#[test]
fn cleaning_runs_on_every_path_and_preserves_real_fields() {
    let guard = AbuseGuard::new(GuardConfig::default());
    let mut data = form(&[
        ("name", "Rui"),
        ("message", "real content"),
        ("website", "filled by a bot"),
        ("phone_number", "12345"),
    ]);

    // Clean even though this submission would not be classified as a bot.
    guard.clean_form(&mut data);

    for field in CATALOG {
        assert!(!data.contains_key(field.name));
    }
    assert_eq!(data.len(), 2);
    assert_eq!(data.get("name").map(String::as_str), Some("Rui"));
    assert_eq!(data.get("message").map(String::as_str), Some("real content"));
}

#[test]
fn rendered_decoys_rotate_within_the_catalog() {
    let guard = AbuseGuard::new(GuardConfig::default());
    let fields = guard.honeypot_fields();
    assert_eq!(fields.len(), 3);
    for field in fields {
        assert!(CATALOG.iter().any(|c| c.name == field.name));
    }
}

#[test]
fn session_bootstrap_scores_a_real_browser_low() {
    let guard = AbuseGuard::new(GuardConfig::default());
    let fp = guard.collect_fingerprint("s1", Some(&browser_attrs()));
    assert_eq!(fp.origin, FingerprintOrigin::Client);

    let assessment = guard.score_fingerprint(&fp);
    assert!(!assessment.is_suspicious);
    assert!(assessment.risk_score < 0.5);
}

#[test]
fn headless_context_fails_open_toward_scrutiny() {
    let guard = AbuseGuard::new(GuardConfig::default());
    let fp = guard.collect_fingerprint("s1", None);
    assert_eq!(fp.origin, FingerprintOrigin::Degraded);

    let assessment = guard.score_fingerprint(&fp);
    assert!(assessment.is_suspicious);
    assert!(!assessment.reasons.is_empty());
}

#[test]
fn inconsistent_returning_fingerprint_earns_a_cooldown() {
    let guard = AbuseGuard::new(GuardConfig::default());

    // Bootstrap: the client caches hash + raw fields for later comparison.
    let first = guard.collect_fingerprint("s1", Some(&browser_attrs()));

    // The "same" session returns looking like automation.
    let mut changed = browser_attrs();
    changed.user_agent = Some("python-requests/2.32".into());
    changed.platform = Some("Linux x86_64".into());
    changed.screen_resolution = Some("0x0".into());
    changed.hardware_concurrency = Some(1);
    let second = guard.collect_fingerprint("s1", Some(&changed));

    let comparison = guard.compare_fingerprints(&first, &second);
    assert!(!comparison.is_same);
    assert!(comparison.differences.len() >= 4);
    assert_ne!(first.hash(), second.hash());

    // Host policy: inconsistent identity on a live session earns friction.
    guard.start_cooldown("s1", Duration::from_secs(60));
    assert!(!guard.decide("s1").can_send);
    assert_eq!(guard.cooldown_session_count(), 1);
}
