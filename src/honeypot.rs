//! Honeypot form tripwires.
//!
//! A fixed catalog of decoy fields is offered to form renders; real UIs
//! hide them from humans (zero-size, off-screen, non-interactive) while
//! naive automated form-fillers populate them anyway. Inspection scores
//! each filled decoy and the shape of its value.
//!
//! Renders sample a random subset of the catalog, but inspection always
//! evaluates the full catalog — the server cannot assume which subset a
//! given client actually saw.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::debug;

use crate::config::HoneypotConfig;

/// A decoy form field: never shown to humans, attractive to bots.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HoneypotField {
    /// Form field name, as submitted.
    pub name: &'static str,
    /// HTML input type the render should use.
    pub field_type: &'static str,
    /// Placeholder text, to look plausible in markup.
    pub placeholder: &'static str,
}

/// The decoy-field catalog. Immutable; defined at process start.
pub const CATALOG: &[HoneypotField] = &[
    HoneypotField { name: "website", field_type: "url", placeholder: "https://" },
    HoneypotField { name: "email_confirmation", field_type: "email", placeholder: "Confirm your email" },
    HoneypotField { name: "phone_number", field_type: "tel", placeholder: "Phone number" },
    HoneypotField { name: "fax_number", field_type: "tel", placeholder: "Fax" },
    HoneypotField { name: "company", field_type: "text", placeholder: "Company name" },
    HoneypotField { name: "middle_name", field_type: "text", placeholder: "Middle name" },
    HoneypotField { name: "address_line_2", field_type: "text", placeholder: "Address line 2" },
    HoneypotField { name: "preferred_contact", field_type: "text", placeholder: "How should we reach you?" },
];

/// Generic placeholder values automated form-fillers commonly submit.
const BOT_VALUES: &[&str] = &[
    "test",
    "testing",
    "admin",
    "user",
    "name",
    "asdf",
    "qwerty",
    "12345",
    "1234567890",
    "test@test.com",
    "example",
    "lorem ipsum",
    "john doe",
    "abc123",
];

// Per-field scoring increments. A bare fill alone stays under the default
// 0.5 verdict threshold; crossing it takes a recognizably bot-shaped value.
const FIELD_FILL_WEIGHT: f32 = 0.3;
const BOT_VALUE_WEIGHT: f32 = 0.5;
const SHORT_VALUE_WEIGHT: f32 = 0.2;
const LONG_VALUE_WEIGHT: f32 = 0.2;
const REPEAT_RUN_WEIGHT: f32 = 0.2;
const ALL_DIGIT_WEIGHT: f32 = 0.2;
const ALL_ALPHA_WEIGHT: f32 = 0.1;

/// Verdict for a submitted form.
#[derive(Debug, Clone, Serialize)]
pub struct HoneypotResult {
    /// Whether the submission is classified as automated.
    pub is_bot: bool,
    /// Human-readable explanation, absent for clean submissions.
    pub reason: Option<String>,
    /// Names of the decoy fields that arrived filled.
    pub detected_fields: Vec<String>,
    /// Accumulated risk in [0, 1].
    pub risk_score: f32,
}

/// Inspects submitted form data against the decoy catalog.
#[derive(Debug)]
pub struct HoneypotInspector {
    config: HoneypotConfig,
}

impl HoneypotInspector {
    /// Create an inspector with the given thresholds.
    pub fn new(config: HoneypotConfig) -> Self {
        Self { config }
    }

    /// Inspect submitted form data. Evaluates every catalog field,
    /// regardless of which subset the render actually included.
    pub fn inspect(&self, form: &HashMap<String, String>) -> HoneypotResult {
        let mut detected_fields = Vec::new();
        let mut score = 0.0f32;

        for field in CATALOG {
            let Some(value) = form.get(field.name) else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }

            detected_fields.push(field.name.to_string());
            score += FIELD_FILL_WEIGHT + value_risk(value);
        }

        if detected_fields.is_empty() {
            return HoneypotResult {
                is_bot: false,
                reason: None,
                detected_fields,
                risk_score: 0.0,
            };
        }

        // Filling many distinct decoys is conclusive on its own.
        let (is_bot, risk_score, reason) = if detected_fields.len() > self.config.max_filled_fields {
            (
                true,
                1.0,
                format!("{} honeypot fields filled", detected_fields.len()),
            )
        } else {
            let risk_score = score.min(1.0);
            (
                risk_score > self.config.bot_threshold,
                risk_score,
                format!("honeypot fields filled: {}", detected_fields.join(", ")),
            )
        };

        debug!(
            fields = detected_fields.len(),
            risk = risk_score,
            is_bot,
            "Honeypot inspection complete"
        );

        HoneypotResult {
            is_bot,
            reason: Some(reason),
            detected_fields,
            risk_score,
        }
    }

    /// Strip every catalog field from the form so decoy values never reach
    /// downstream business logic. Must run on every submission path, not
    /// just suspected ones.
    pub fn clean(&self, form: &mut HashMap<String, String>) {
        for field in CATALOG {
            form.remove(field.name);
        }
    }

    /// Sample a random subset of the catalog for one render. Rotation keeps
    /// scripted fillers from learning a stable set of names to skip.
    pub fn sample_fields(&self) -> Vec<&'static HoneypotField> {
        let count = self.config.rendered_fields.min(CATALOG.len());
        CATALOG
            .choose_multiple(&mut rand::thread_rng(), count)
            .collect()
    }
}

/// Score the shape of one submitted decoy value.
fn value_risk(value: &str) -> f32 {
    let mut risk = 0.0;

    if BOT_VALUES.contains(&value.to_lowercase().as_str()) {
        risk += BOT_VALUE_WEIGHT;
    }

    let chars = value.chars().count();
    if chars < 3 {
        risk += SHORT_VALUE_WEIGHT;
    }
    if chars > 100 {
        risk += LONG_VALUE_WEIGHT;
    }

    if has_repeat_run(value, 4) {
        risk += REPEAT_RUN_WEIGHT;
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        risk += ALL_DIGIT_WEIGHT;
    } else if value.chars().all(char::is_alphabetic) {
        risk += ALL_ALPHA_WEIGHT;
    }

    risk
}

/// Whether `value` contains a run of at least `len` identical characters.
fn has_repeat_run(value: &str, len: usize) -> bool {
    let mut current: Option<char> = None;
    let mut run = 0usize;
    for ch in value.chars() {
        if Some(ch) == current {
            run += 1;
            if run >= len {
                return true;
            }
        } else {
            current = Some(ch);
            run = 1;
        }
    }
    run >= len
}
