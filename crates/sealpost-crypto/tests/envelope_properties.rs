//! Property-based tests for the envelope.
//!
//! Verifies the transport-level guarantees: round-trip fidelity, fresh
//! IVs, and fail-closed behavior under arbitrary single-character
//! tampering of either wire field.

use proptest::prelude::*;
use sealpost_crypto::{CryptoError, EnvelopeKeys, open, seal};

fn arb_keys() -> impl Strategy<Value = EnvelopeKeys> {
    (any::<[u8; 32]>(), any::<[u8; 32]>())
        .prop_filter("keys must differ", |(a, m)| a != m)
        .prop_map(|(a, m)| EnvelopeKeys::new(a, m).expect("distinct keys"))
}

proptest! {
    #[test]
    fn roundtrip_any_plaintext(keys in arb_keys(), plaintext in proptest::collection::vec(any::<u8>(), 0..512)) {
        let envelope = seal(&plaintext, &keys).expect("seal");
        let recovered = open(&envelope.encoded_payload, &envelope.signature, &keys).expect("open");
        prop_assert_eq!(recovered.as_slice(), plaintext.as_slice());
    }

    #[test]
    fn sealing_twice_never_repeats_payload(keys in arb_keys(), plaintext in proptest::collection::vec(any::<u8>(), 1..128)) {
        let first = seal(&plaintext, &keys).expect("seal");
        let second = seal(&plaintext, &keys).expect("seal");
        // 96-bit random IVs: a repeat would be a CSPRNG failure.
        prop_assert_ne!(first.encoded_payload, second.encoded_payload);
    }

    #[test]
    fn tampered_payload_always_fails_closed(
        keys in arb_keys(),
        plaintext in proptest::collection::vec(any::<u8>(), 1..128),
        position in any::<prop::sample::Index>(),
        flip in 1u8..=127,
    ) {
        let envelope = seal(&plaintext, &keys).expect("seal");

        let mut bytes = envelope.encoded_payload.clone().into_bytes();
        let i = position.index(bytes.len());
        bytes[i] ^= flip;
        let Ok(tampered) = String::from_utf8(bytes) else {
            // Flip produced invalid UTF-8; the wire layer would reject it
            // before this code runs.
            return Ok(());
        };
        prop_assume!(tampered != envelope.encoded_payload);

        let err = open(&tampered, &envelope.signature, &keys).expect_err("must fail");
        // HMAC runs first, so any payload change is an authentication
        // failure, never garbage plaintext or a partial decrypt.
        prop_assert_eq!(err, CryptoError::Authentication);
    }

    #[test]
    fn tampered_signature_always_fails_closed(
        keys in arb_keys(),
        plaintext in proptest::collection::vec(any::<u8>(), 1..128),
        position in any::<prop::sample::Index>(),
        flip in 1u8..=127,
    ) {
        let envelope = seal(&plaintext, &keys).expect("seal");

        let mut bytes = envelope.signature.clone().into_bytes();
        let i = position.index(bytes.len());
        bytes[i] ^= flip;
        let Ok(tampered) = String::from_utf8(bytes) else {
            return Ok(());
        };
        prop_assume!(tampered != envelope.signature);

        let err = open(&envelope.encoded_payload, &tampered, &keys).expect_err("must fail");
        prop_assert_eq!(err, CryptoError::Authentication);
    }
}
