use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::collections::HashMap;

use chatwarden::{AbuseGuard, ClientAttributes, GuardConfig, RateLimitConfig};

// Benchmarks the hot per-message path and the per-submission form path.
// Each verdict must stay sub-millisecond; these catch regressions in the
// store's locking or in the scoring loops.

fn decide_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("decide");
    group.throughput(Throughput::Elements(1));

    // Allowed path: pacing disabled so every message commits.
    let open = AbuseGuard::new(GuardConfig {
        rate: RateLimitConfig {
            min_message_interval_ms: 0,
            max_messages_per_second: u32::MAX,
            max_messages_per_minute: u32::MAX,
            ..RateLimitConfig::default()
        },
        ..GuardConfig::default()
    });
    group.bench_function("allowed", |b| {
        let mut n = 0u64;
        b.iter(|| {
            // Spread across sessions to exercise map sharding.
            n += 1;
            open.decide(&format!("session-{}", n % 1024))
        })
    });

    // Denied path: default pacing rejects everything after the first.
    let strict = AbuseGuard::new(GuardConfig::default());
    strict.decide("hot");
    group.bench_function("denied", |b| b.iter(|| strict.decide("hot")));

    group.finish();
}

fn screening_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("screening");
    group.throughput(Throughput::Elements(1));

    let guard = AbuseGuard::new(GuardConfig::default());

    let form: HashMap<String, String> = [
        ("name", "Rui"),
        ("message", "A perfectly ordinary inquiry about pricing."),
        ("website", "test"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    group.bench_function("inspect_form", |b| b.iter(|| guard.inspect_form(&form)));

    let attrs = ClientAttributes {
        user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/128.0".into()),
        language: Some("en-US".into()),
        timezone: Some("UTC".into()),
        screen_resolution: Some("1920x1080".into()),
        platform: Some("Linux x86_64".into()),
        cookie_enabled: Some(true),
        hardware_concurrency: Some(8),
        ..ClientAttributes::default()
    };
    let fp = guard.collect_fingerprint("bench", Some(&attrs));
    group.bench_function("score_fingerprint", |b| b.iter(|| guard.score_fingerprint(&fp)));

    group.finish();
}

criterion_group!(benches, decide_benchmark, screening_benchmark);
criterion_main!(benches);
