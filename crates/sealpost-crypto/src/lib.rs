//! Sealpost cryptographic envelope.
//!
//! Builds and opens the authenticated-encryption envelope that carries one
//! forwarded message: AES-256-GCM over the plaintext, then a detached
//! HMAC-SHA256 over the base64-encoded `iv ‖ ciphertext ‖ tag` blob.
//!
//! Wire layout of the encoded payload (before base64):
//!
//! ```text
//! [ iv (12 bytes) | ciphertext + tag (16 bytes) ]
//! ```
//!
//! # Security
//!
//! - The AEAD key and the MAC key are independent 32-byte keys and are
//!   rejected at construction if equal.
//! - The IV comes from the OS CSPRNG on every seal. Nonce reuse under the
//!   same key breaks GCM entirely, so no counter scheme is offered.
//! - Verification is a typestate: decryption is only reachable through
//!   [`VerifiedEnvelope`], which can only be produced by a successful
//!   constant-time HMAC check. A signature mismatch never triggers a
//!   decryption attempt.
//! - HMAC mismatch and GCM tag failure surface as the same
//!   [`CryptoError::Authentication`] so a caller (or attacker) cannot tell
//!   which of the two checks failed.
//! - No associated data is bound into the AEAD. The HMAC covers only the
//!   encoded payload; `sender`/`timestamp` travel outside it. This matches
//!   the deployed wire contract; binding them as AAD would be stronger
//!   but breaks existing senders.

#![forbid(unsafe_code)]

mod envelope;
mod error;
mod fingerprint;
mod keys;

pub use envelope::{open, seal, SealedEnvelope, VerifiedEnvelope, GCM_IV_LEN, GCM_TAG_LEN};
pub use error::CryptoError;
pub use fingerprint::fingerprint;
pub use keys::{EnvelopeKeys, KEY_LEN};
