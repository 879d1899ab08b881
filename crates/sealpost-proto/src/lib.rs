//! Sealpost wire protocol types.
//!
//! JSON request/response bodies exchanged between the device forwarder and
//! the relay server. The envelope payload inside a request is opaque here:
//! this crate only enforces the *shape* of a request (field presence and
//! bounds), never its cryptographic validity.
//!
//! # Security
//!
//! Shape validation happens before any cryptographic work, so malformed
//! requests are rejected cheaply. Validation errors carry only the field
//! name; request content is never echoed back to the caller.

#![forbid(unsafe_code)]

mod category;
mod errors;
mod request;

pub use category::{MessageCategory, Urgency};
pub use errors::ProtocolError;
pub use request::{
    ForwardRequest, ForwardResponse, HealthResponse, MAX_PAYLOAD_CHARS, SIGNATURE_HEX_CHARS,
};
