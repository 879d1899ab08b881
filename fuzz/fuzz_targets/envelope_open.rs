//! Fuzz target for envelope verification and decryption.
//!
//! Feeds arbitrary payload and signature strings through the full
//! verify-then-decrypt path. Every input must produce a clean error or a
//! plaintext; panics and hangs are bugs.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sealpost_crypto::{EnvelopeKeys, open};

fuzz_target!(|input: (&str, &str)| {
    let (payload, signature) = input;

    let keys = EnvelopeKeys::new([0x11; 32], [0x22; 32])
        .expect("distinct fixed keys are always valid");

    // Forged wire input must never authenticate, let alone panic.
    let _ = open(payload, signature, &keys);
});
