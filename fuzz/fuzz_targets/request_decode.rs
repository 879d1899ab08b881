//! Fuzz target for wire request decoding and shape validation.
//!
//! Arbitrary bytes through serde_json into [`ForwardRequest`], then the
//! shape check. Neither step may panic on any input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sealpost_proto::ForwardRequest;

fuzz_target!(|data: &[u8]| {
    if let Ok(request) = serde_json::from_slice::<ForwardRequest>(data) {
        let _ = request.validate_shape();
    }
});
