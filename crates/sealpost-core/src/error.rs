//! The server pipeline's unified rejection type.

use sealpost_crypto::CryptoError;
use sealpost_proto::ProtocolError;
use thiserror::Error;

use crate::{config::ConfigError, delivery::DeliveryError, replay::ReplayError};

/// Why a forward request was not delivered.
///
/// Variants map one-to-one onto the server's HTTP statuses; the messages
/// are safe to return to clients and never contain payload material.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Request shape is invalid: missing fields, oversized payload, or
    /// undecodable envelope structure.
    #[error("malformed request")]
    Malformed,

    /// Signature or ciphertext authentication failed. Deliberately
    /// indistinguishable between the two.
    #[error("authentication failed")]
    Authentication,

    /// Timestamp is older than the freshness window.
    #[error("request is {age_secs}s old, past the freshness window")]
    Stale {
        /// Seconds between server time and the request timestamp.
        age_secs: u64,
    },

    /// Timestamp is ahead of server time beyond tolerated skew.
    #[error("request timestamp is {skew_secs}s in the future")]
    FromFuture {
        /// Seconds ahead of server time.
        skew_secs: u64,
    },

    /// Caller exceeded the request rate limit.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Server-side misconfiguration surfaced at request time.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Downstream delivery failed after the envelope was accepted.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl From<CryptoError> for ForwardError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::Authentication => Self::Authentication,
            CryptoError::Malformed => Self::Malformed,
            // Key-shape failures are configuration problems, not request
            // problems; they should have been caught at startup.
            CryptoError::InvalidKey(detail) => {
                Self::Config(ConfigError::InvalidKeyMaterial(detail))
            },
            CryptoError::IdenticalKeys => {
                Self::Config(ConfigError::InvalidKeyMaterial("identical keys"))
            },
        }
    }
}

impl From<ReplayError> for ForwardError {
    fn from(err: ReplayError) -> Self {
        match err {
            ReplayError::Stale { age_secs } => Self::Stale { age_secs },
            ReplayError::FromFuture { skew_secs } => Self::FromFuture { skew_secs },
        }
    }
}

impl From<ProtocolError> for ForwardError {
    fn from(_: ProtocolError) -> Self {
        Self::Malformed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crypto_failures_map_by_kind() {
        assert!(matches!(ForwardError::from(CryptoError::Authentication), ForwardError::Authentication));
        assert!(matches!(ForwardError::from(CryptoError::Malformed), ForwardError::Malformed));
        assert!(matches!(ForwardError::from(CryptoError::IdenticalKeys), ForwardError::Config(_)));
    }

    #[test]
    fn messages_never_mention_payload_fields() {
        let err = ForwardError::Authentication;
        assert_eq!(err.to_string(), "authentication failed");
    }
}
