//! Rule-based message classification.
//!
//! One versioned, data-driven rule table ([`rules::RULES`]) evaluated by a
//! single interpreter. The device pipeline (pre-filter) and the server
//! pipeline (defense-in-depth re-classification) both call [`classify`],
//! so the two realizations cannot drift: same table, same priority order,
//! same result for the same text.
//!
//! # Invariants
//!
//! - Pure and total: every input maps to exactly one category, no
//!   exceptions, no I/O, no ambient state.
//! - First match wins, in table order; the priority order is a
//!   deliberate tie-break policy (OTP outranks TRANSACTION outranks
//!   SECURITY_ALERT outranks BILL).
//! - Confidence is telemetry only; no security decision may read it.

mod rules;

use rules::{Predicate, RULES};
use sealpost_proto::{MessageCategory, Urgency};

use crate::text;

/// Version of the rule table. Bumped whenever [`rules::RULES`] changes so
/// deployed device and server builds can detect divergence.
pub const RULE_TABLE_VERSION: u32 = 1;

/// Result of classifying one message body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Matched category, [`MessageCategory::Unknown`] when no rule fired.
    pub category: MessageCategory,
    /// Rule confidence in `[0, 1]`. Logging/telemetry only.
    pub confidence: f64,
    /// Urgency tier consumed by template selection.
    pub urgency: Urgency,
}

/// Classify a message body.
///
/// Deterministic and referentially transparent: repeated calls on the
/// same text always produce the same result.
#[must_use]
pub fn classify(body: &str) -> Classification {
    let lower = body.to_lowercase();

    for rule in RULES {
        if eval(&rule.when, body, &lower) {
            return Classification {
                category: rule.category,
                confidence: rule.confidence,
                urgency: rule.urgency,
            };
        }
    }

    Classification {
        category: MessageCategory::Unknown,
        confidence: 0.0,
        urgency: Urgency::Low,
    }
}

/// The single predicate interpreter. `body` keeps original casing for
/// digit scanning; `lower` backs all keyword and marker matching.
fn eval(predicate: &Predicate, body: &str, lower: &str) -> bool {
    match predicate {
        Predicate::KeywordAny(keywords) => keywords.iter().any(|kw| lower.contains(kw)),
        Predicate::DigitRun { min, max } => text::has_digit_run(body, *min, *max),
        Predicate::CurrencyAmount => text::has_currency_amount(lower),
        Predicate::MaskedAccountRef => text::has_masked_account_ref(lower),
        Predicate::AllOf(inner) => inner.iter().all(|p| eval(p, body, lower)),
        Predicate::AnyOf(inner) => inner.iter().any(|p| eval(p, body, lower)),
    }
}
