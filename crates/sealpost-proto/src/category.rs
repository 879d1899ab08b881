//! Message categories shared by the device and server pipelines.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category assigned to a forwarded message.
///
/// The device attaches its category as an advisory hint on the wire; the
/// server re-derives the category from the decrypted text and trusts its
/// own result for template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageCategory {
    /// One-time password / verification code.
    #[serde(rename = "OTP")]
    Otp,
    /// Debit/credit/transfer notification.
    #[serde(rename = "TRANSACTION")]
    Transaction,
    /// Bill or payment-due notification.
    #[serde(rename = "BILL")]
    Bill,
    /// Account security alert.
    #[serde(rename = "SECURITY_ALERT")]
    SecurityAlert,
    /// No rule matched.
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl MessageCategory {
    /// All categories, in classifier priority order: security alerts
    /// outrank bills, and `Unknown` is the fallback.
    pub const ALL: [Self; 5] =
        [Self::Otp, Self::Transaction, Self::SecurityAlert, Self::Bill, Self::Unknown];

    /// Wire representation of the category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Otp => "OTP",
            Self::Transaction => "TRANSACTION",
            Self::Bill => "BILL",
            Self::SecurityAlert => "SECURITY_ALERT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency tier attached to a classification.
///
/// Consumed by template selection and logging only, never by a security
/// decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    /// Deliver as soon as possible (OTPs, security alerts).
    High,
    /// Normal delivery (transaction notifications).
    Medium,
    /// Informational (bills).
    Low,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Medium => f.write_str("medium"),
            Self::Low => f.write_str("low"),
        }
    }
}
