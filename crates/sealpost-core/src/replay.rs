//! Freshness window validation for request timestamps.
//!
//! Bounds the value of replaying a captured request: a signed envelope is
//! only accepted while its timestamp sits within `±window` of server
//! time. The caller must verify the envelope signature *before* trusting
//! the timestamp fed into this check; the server pipeline enforces that
//! ordering through the crypto crate's verify-then-decrypt typestate.

use thiserror::Error;

/// Default freshness window in seconds.
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 300;

/// Timestamp outside the freshness window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReplayError {
    /// Too old: possible replay of a captured request.
    #[error("request is {age_secs}s old, past the freshness window")]
    Stale {
        /// Seconds between server time and the request timestamp.
        age_secs: u64,
    },

    /// Timestamp ahead of server time beyond tolerated clock skew.
    #[error("request timestamp is {skew_secs}s in the future")]
    FromFuture {
        /// Seconds the timestamp is ahead of server time.
        skew_secs: u64,
    },
}

/// Validate `timestamp` against `now` with a symmetric tolerance window.
///
/// A timestamp exactly `window_secs` old (or ahead) is still accepted;
/// one second further is rejected.
///
/// # Errors
///
/// [`ReplayError::Stale`] or [`ReplayError::FromFuture`].
pub fn validate(timestamp: u64, now: u64, window_secs: u64) -> Result<(), ReplayError> {
    if now > timestamp {
        let age_secs = now - timestamp;
        if age_secs > window_secs {
            return Err(ReplayError::Stale { age_secs });
        }
    } else {
        let skew_secs = timestamp - now;
        if skew_secs > window_secs {
            return Err(ReplayError::FromFuture { skew_secs });
        }
    }
    Ok(())
}
