//! Forwarding request/response bodies.

use serde::{Deserialize, Serialize};

use crate::{MessageCategory, ProtocolError};

/// Maximum accepted length of the base64 envelope payload.
///
/// SMS bodies are short; anything past this bound is either corruption or
/// an attempt to burn server CPU on decode work.
pub const MAX_PAYLOAD_CHARS: usize = 2048;

/// Exact length of a hex-encoded HMAC-SHA256 signature.
pub const SIGNATURE_HEX_CHARS: usize = 64;

/// Maximum accepted sender label length.
const MAX_SENDER_CHARS: usize = 100;

/// One forwarding attempt as posted by the device.
///
/// Exists only in transit and during server-side handling, never persisted.
///
/// # Security
///
/// `sender` and `timestamp` travel outside the HMAC'd envelope; the replay
/// window bounds the value of tampering with the timestamp, and `sender` is
/// used only for allowlisting and template labels, never as a secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRequest {
    /// Base64 of `iv ‖ ciphertext ‖ tag`.
    pub encrypted_payload: String,

    /// Hex HMAC-SHA256 over `encrypted_payload`.
    pub hmac_signature: String,

    /// Originating channel label (e.g. an SMS sender ID).
    pub sender: String,

    /// Sender-side Unix seconds at encryption time.
    pub timestamp: u64,

    /// Advisory category from device-side classification. The server
    /// re-derives the category and ignores this for anything that matters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<MessageCategory>,
}

impl ForwardRequest {
    /// Validate field shapes without touching cryptography.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProtocolError`] encountered, naming the field
    /// but never echoing its content.
    pub fn validate_shape(&self) -> Result<(), ProtocolError> {
        if self.encrypted_payload.is_empty() {
            return Err(ProtocolError::EmptyField("encrypted_payload"));
        }
        if self.encrypted_payload.len() > MAX_PAYLOAD_CHARS {
            return Err(ProtocolError::FieldTooLong("encrypted_payload"));
        }
        if self.hmac_signature.len() != SIGNATURE_HEX_CHARS {
            return Err(if self.hmac_signature.len() < SIGNATURE_HEX_CHARS {
                ProtocolError::FieldTooShort("hmac_signature")
            } else {
                ProtocolError::FieldTooLong("hmac_signature")
            });
        }
        if !self.hmac_signature.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ProtocolError::InvalidCharacters("hmac_signature"));
        }
        if self.sender.is_empty() {
            return Err(ProtocolError::EmptyField("sender"));
        }
        if self.sender.len() > MAX_SENDER_CHARS {
            return Err(ProtocolError::FieldTooLong("sender"));
        }
        // Control characters cannot appear in a sender label; the dedup
        // fingerprint relies on this for its domain separator.
        if self.sender.chars().any(char::is_control) {
            return Err(ProtocolError::InvalidCharacters("sender"));
        }
        if self.timestamp == 0 {
            return Err(ProtocolError::InvalidTimestamp);
        }
        Ok(())
    }
}

/// Server response to a forwarding attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardResponse {
    /// Whether the message was accepted (duplicates count as accepted).
    pub success: bool,
    /// Human-readable, content-free status line.
    pub message: String,
    /// Delivery collaborator message ID, when a send actually happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<String>,
}

/// Health probe response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"healthy"` or `"degraded"`.
    pub status: String,
    /// Whether the delivery collaborator is configured and reachable.
    pub delivery_configured: bool,
}
