//! Crypto error types.

use thiserror::Error;

/// Failures from envelope construction and opening.
///
/// # Security
///
/// [`CryptoError::Authentication`] covers both HMAC mismatch and AEAD tag
/// failure with one message: callers must not be able to distinguish the
/// two. No variant ever carries key material, plaintext, or signature
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key material is not exactly 32 bytes of valid hex.
    #[error("invalid key material: {0}")]
    InvalidKey(&'static str),

    /// The AEAD key and MAC key are equal.
    #[error("AEAD key and MAC key must differ")]
    IdenticalKeys,

    /// Signature or AEAD tag verification failed.
    #[error("authentication failed")]
    Authentication,

    /// The encoded payload is structurally invalid (bad base64 or too
    /// short to contain an IV and tag).
    #[error("malformed envelope payload")]
    Malformed,
}
