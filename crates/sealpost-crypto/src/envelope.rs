//! Seal and open operations for the message envelope.

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{error::CryptoError, keys::EnvelopeKeys};

type HmacSha256 = Hmac<Sha256>;

/// AES-GCM IV length in bytes (96-bit nonce).
pub const GCM_IV_LEN: usize = 12;

/// AES-GCM authentication tag length in bytes (128-bit tag).
pub const GCM_TAG_LEN: usize = 16;

/// A sealed envelope ready for transport.
///
/// # Invariants
///
/// `signature` is always the hex HMAC-SHA256 of `encoded_payload` under
/// the MAC key when produced by [`seal`]. Values built from wire input are
/// untrusted until [`SealedEnvelope::verify`] succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedEnvelope {
    /// Base64 of `iv ‖ ciphertext ‖ tag`.
    pub encoded_payload: String,
    /// Hex HMAC-SHA256 over `encoded_payload`.
    pub signature: String,
}

impl SealedEnvelope {
    /// Rebuild an envelope from wire fields. No validation happens here;
    /// the result is untrusted until verified.
    #[must_use]
    pub fn from_wire(encoded_payload: impl Into<String>, signature: impl Into<String>) -> Self {
        Self { encoded_payload: encoded_payload.into(), signature: signature.into() }
    }

    /// Check the detached HMAC in constant time.
    ///
    /// The returned [`VerifiedEnvelope`] is the only path to decryption,
    /// so a failed signature can never reach the AEAD.
    ///
    /// # Errors
    ///
    /// `CryptoError::Authentication` on any mismatch, including a
    /// signature that is not valid hex.
    pub fn verify(&self, keys: &EnvelopeKeys) -> Result<VerifiedEnvelope<'_>, CryptoError> {
        let mut sig_bytes = [0u8; 32];
        if self.signature.len() != 64
            || hex::decode_to_slice(&self.signature, &mut sig_bytes).is_err()
        {
            return Err(CryptoError::Authentication);
        }

        let mut mac = <HmacSha256 as Mac>::new_from_slice(keys.mac())
            .map_err(|_| CryptoError::InvalidKey("MAC key rejected"))?;
        mac.update(self.encoded_payload.as_bytes());
        mac.verify_slice(&sig_bytes).map_err(|_| CryptoError::Authentication)?;

        Ok(VerifiedEnvelope { encoded_payload: &self.encoded_payload })
    }
}

/// Proof that an envelope's HMAC checked out.
///
/// Borrowing from the [`SealedEnvelope`] ties the proof to the exact
/// payload bytes that were verified.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedEnvelope<'a> {
    encoded_payload: &'a str,
}

impl VerifiedEnvelope<'_> {
    /// Decrypt the payload.
    ///
    /// GCM's own tag check runs here as a second, cryptographically
    /// independent integrity check on top of the HMAC.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Malformed`: bad base64, or fewer than IV+tag bytes
    /// - `CryptoError::Authentication`: GCM tag failure
    ///
    /// # Security
    ///
    /// The returned plaintext is wrapped in [`Zeroizing`]; callers must
    /// not log or persist it beyond the active processing step.
    pub fn decrypt(&self, keys: &EnvelopeKeys) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        let raw = BASE64.decode(self.encoded_payload).map_err(|_| CryptoError::Malformed)?;
        if raw.len() < GCM_IV_LEN + GCM_TAG_LEN {
            return Err(CryptoError::Malformed);
        }
        let (iv, ciphertext) = raw.split_at(GCM_IV_LEN);

        let cipher = Aes256Gcm::new_from_slice(keys.aes())
            .map_err(|_| CryptoError::InvalidKey("AES key rejected"))?;
        let plaintext = cipher
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|_| CryptoError::Authentication)?;

        Ok(Zeroizing::new(plaintext))
    }
}

/// Encrypt and sign one message body.
///
/// Generates a fresh random 12-byte IV from the OS CSPRNG, encrypts with
/// AES-256-GCM, base64-encodes `iv ‖ ciphertext ‖ tag`, and signs the
/// encoding with HMAC-SHA256 under the independent MAC key.
///
/// # Errors
///
/// `CryptoError::InvalidKey` if the key material is rejected by the
/// underlying primitives (cannot happen for keys built via
/// [`EnvelopeKeys`]).
pub fn seal(plaintext: &[u8], keys: &EnvelopeKeys) -> Result<SealedEnvelope, CryptoError> {
    let cipher = Aes256Gcm::new_from_slice(keys.aes())
        .map_err(|_| CryptoError::InvalidKey("AES key rejected"))?;
    let iv = Aes256Gcm::generate_nonce(&mut OsRng);

    let Ok(ciphertext) = cipher.encrypt(&iv, plaintext) else {
        unreachable!("AES-GCM encryption cannot fail with a valid key and nonce");
    };

    let mut raw = Vec::with_capacity(GCM_IV_LEN + ciphertext.len());
    raw.extend_from_slice(&iv);
    raw.extend_from_slice(&ciphertext);
    let encoded_payload = BASE64.encode(&raw);

    let mut mac = <HmacSha256 as Mac>::new_from_slice(keys.mac())
        .map_err(|_| CryptoError::InvalidKey("MAC key rejected"))?;
    mac.update(encoded_payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(SealedEnvelope { encoded_payload, signature })
}

/// Verify and decrypt in one step.
///
/// Convenience wrapper for callers that have no work to do between the
/// two phases. The server pipeline uses the two-phase form instead, so
/// the replay check can sit between signature verification and
/// decryption.
///
/// # Errors
///
/// As [`SealedEnvelope::verify`] and [`VerifiedEnvelope::decrypt`].
pub fn open(
    encoded_payload: &str,
    signature: &str,
    keys: &EnvelopeKeys,
) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let envelope = SealedEnvelope::from_wire(encoded_payload, signature);
    let verified = envelope.verify(keys)?;
    verified.decrypt(keys)
}
