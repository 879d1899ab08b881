//! Protocol-level errors.

use thiserror::Error;

/// Shape-validation failures for wire messages.
///
/// # Security
///
/// Variants name the offending field but never include its value, so a
/// rejection response cannot leak request content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A required field is empty.
    #[error("field `{0}` must not be empty")]
    EmptyField(&'static str),

    /// A field exceeds its maximum length.
    #[error("field `{0}` exceeds its maximum length")]
    FieldTooLong(&'static str),

    /// A field is shorter than its required length.
    #[error("field `{0}` is shorter than its required length")]
    FieldTooShort(&'static str),

    /// A field contains characters outside its expected alphabet.
    #[error("field `{0}` contains invalid characters")]
    InvalidCharacters(&'static str),

    /// The timestamp is zero or otherwise not a plausible Unix time.
    #[error("timestamp is not a valid Unix time")]
    InvalidTimestamp,
}
