//! The versioned classification rule table.
//!
//! Rules are data, not code: an ordered list of category → predicate
//! entries interpreted by `classify::eval`. Changing anything here
//! requires bumping [`crate::classify::RULE_TABLE_VERSION`]: deployed
//! device builds classify with the same table, and a silent divergence
//! means device-side filtering decisions stop matching the server's.

use sealpost_proto::{MessageCategory, Urgency};

/// Predicate over a message body.
#[derive(Debug)]
pub(super) enum Predicate {
    /// Any of the keywords occurs in the lowercased body.
    KeywordAny(&'static [&'static str]),
    /// A standalone digit run of length `min..=max` occurs.
    DigitRun { min: usize, max: usize },
    /// A currency marker adjacent to a number occurs.
    CurrencyAmount,
    /// An `XXnnnn` masked account/card reference occurs.
    MaskedAccountRef,
    /// All inner predicates hold.
    AllOf(&'static [Predicate]),
    /// At least one inner predicate holds.
    AnyOf(&'static [Predicate]),
}

/// One rule: first match in table order wins.
#[derive(Debug)]
pub(super) struct Rule {
    pub category: MessageCategory,
    pub confidence: f64,
    pub urgency: Urgency,
    pub when: Predicate,
}

const OTP_KEYWORDS: &[&str] = &["otp", "code", "verification", "pin", "password"];

const TRANSACTION_KEYWORDS: &[&str] = &[
    "debited",
    "credited",
    "withdrawn",
    "deposited",
    "transferred",
    "debit",
    "credit",
    "withdrawal",
    "deposit",
    "transfer",
    "a/c",
];

const SECURITY_KEYWORDS: &[&str] = &[
    "alert",
    "security",
    "suspicious",
    "unauthorized",
    "blocked",
    "locked",
    "fraud",
    "scam",
    "phishing",
    "new device",
    "new location",
    "new login",
    "verify identity",
    "verify account",
    "confirm identity",
    "confirm account",
];

const BILL_KEYWORDS: &[&str] = &[
    "bill",
    "invoice",
    "payment",
    "due",
    "overdue",
    "pay by",
    "pay before",
    "due date",
    "due on",
];

/// The rule table, in strict priority order.
pub(super) const RULES: &[Rule] = &[
    Rule {
        category: MessageCategory::Otp,
        confidence: 0.95,
        urgency: Urgency::High,
        when: Predicate::AllOf(&[
            Predicate::DigitRun { min: 4, max: 8 },
            Predicate::KeywordAny(OTP_KEYWORDS),
        ]),
    },
    Rule {
        category: MessageCategory::Transaction,
        confidence: 0.9,
        urgency: Urgency::Medium,
        when: Predicate::AllOf(&[
            Predicate::AnyOf(&[
                Predicate::KeywordAny(TRANSACTION_KEYWORDS),
                Predicate::MaskedAccountRef,
            ]),
            Predicate::CurrencyAmount,
        ]),
    },
    Rule {
        category: MessageCategory::SecurityAlert,
        confidence: 0.85,
        urgency: Urgency::High,
        when: Predicate::KeywordAny(SECURITY_KEYWORDS),
    },
    Rule {
        category: MessageCategory::Bill,
        confidence: 0.8,
        urgency: Urgency::Low,
        when: Predicate::AllOf(&[
            Predicate::KeywordAny(BILL_KEYWORDS),
            Predicate::CurrencyAmount,
        ]),
    },
];
