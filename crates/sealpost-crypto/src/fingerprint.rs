//! Content fingerprints for deduplication.

use sha2::{Digest, Sha256};

/// Domain separator between sender and body. 0x1F (unit separator) cannot
/// appear in a sender label, so distinct (sender, body) pairs cannot
/// collide by boundary shifting.
const SEPARATOR: u8 = 0x1F;

/// Hex SHA-256 fingerprint of one forwarded message.
///
/// Keyed on sender plus decrypted body so the same OTP text from two
/// different senders is not accidentally deduplicated. Only this hash is
/// ever stored, never the plaintext.
#[must_use]
pub fn fingerprint(sender: &str, plaintext: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(sender.as_bytes());
    hasher.update([SEPARATOR]);
    hasher.update(plaintext);
    hex::encode(hasher.finalize())
}
