//! Envelope key material.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Key length for both the AEAD key and the MAC key (AES-256 / HMAC-SHA256).
pub const KEY_LEN: usize = 32;

/// The two independent keys behind one envelope: AES-256-GCM key and
/// HMAC-SHA256 key.
///
/// Construction enforces that both keys decode to exactly 32 bytes and
/// that they differ (compared in constant time). Key bytes are zeroed on
/// drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EnvelopeKeys {
    aes: [u8; KEY_LEN],
    mac: [u8; KEY_LEN],
}

impl EnvelopeKeys {
    /// Build keys from raw 32-byte arrays.
    ///
    /// # Errors
    ///
    /// `CryptoError::IdenticalKeys` when the two keys are equal.
    pub fn new(aes: [u8; KEY_LEN], mac: [u8; KEY_LEN]) -> Result<Self, CryptoError> {
        if aes.ct_eq(&mac).into() {
            return Err(CryptoError::IdenticalKeys);
        }
        Ok(Self { aes, mac })
    }

    /// Build keys from 64-character hex strings (the configuration format).
    ///
    /// # Errors
    ///
    /// `CryptoError::InvalidKey` when either string is not exactly 32
    /// bytes of hex; `CryptoError::IdenticalKeys` when they are equal.
    pub fn from_hex(aes_hex: &str, mac_hex: &str) -> Result<Self, CryptoError> {
        Self::new(decode_key(aes_hex)?, decode_key(mac_hex)?)
    }

    /// AEAD key bytes.
    pub(crate) fn aes(&self) -> &[u8; KEY_LEN] {
        &self.aes
    }

    /// MAC key bytes.
    pub(crate) fn mac(&self) -> &[u8; KEY_LEN] {
        &self.mac
    }
}

// Debug deliberately reveals nothing about the key bytes.
impl std::fmt::Debug for EnvelopeKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("EnvelopeKeys(..)")
    }
}

fn decode_key(key_hex: &str) -> Result<[u8; KEY_LEN], CryptoError> {
    let mut out = [0u8; KEY_LEN];
    if key_hex.len() != KEY_LEN * 2 {
        return Err(CryptoError::InvalidKey("expected 64 hex characters"));
    }
    hex::decode_to_slice(key_hex, &mut out)
        .map_err(|_| CryptoError::InvalidKey("not valid hex"))?;
    Ok(out)
}
