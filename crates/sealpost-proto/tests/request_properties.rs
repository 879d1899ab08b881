//! Property tests for wire decoding and shape validation.

use proptest::prelude::*;
use sealpost_proto::{ForwardRequest, MAX_PAYLOAD_CHARS, MessageCategory};

proptest! {
    #[test]
    fn shape_validation_never_panics(
        payload in ".{0,3000}",
        signature in ".{0,100}",
        sender in ".{0,200}",
        timestamp in proptest::num::u64::ANY,
    ) {
        let request = ForwardRequest {
            encrypted_payload: payload,
            hmac_signature: signature,
            sender,
            timestamp,
            message_type: None,
        };
        let _ = request.validate_shape();
    }

    #[test]
    fn valid_shapes_always_pass(
        payload in "[A-Za-z0-9+/=]{1,100}",
        signature in "[0-9a-f]{64}",
        sender in "[A-Z-]{1,20}",
        timestamp in 1u64..u64::MAX,
    ) {
        let request = ForwardRequest {
            encrypted_payload: payload,
            hmac_signature: signature,
            sender,
            timestamp,
            message_type: Some(MessageCategory::Otp),
        };
        prop_assert!(request.validate_shape().is_ok());
    }

    #[test]
    fn json_roundtrip_preserves_fields(
        payload in "[A-Za-z0-9+/=]{1,200}",
        sender in "[A-Z a-z0-9+-]{1,50}",
        timestamp in 1u64..u64::MAX,
    ) {
        let request = ForwardRequest {
            encrypted_payload: payload,
            hmac_signature: "ab".repeat(32),
            sender,
            timestamp,
            message_type: Some(MessageCategory::Transaction),
        };
        let json = serde_json::to_string(&request).unwrap();
        let back: ForwardRequest = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(request, back);
    }

    #[test]
    fn oversized_payloads_always_rejected(extra in 1usize..100) {
        let request = ForwardRequest {
            encrypted_payload: "A".repeat(MAX_PAYLOAD_CHARS + extra),
            hmac_signature: "ab".repeat(32),
            sender: "BANK".to_string(),
            timestamp: 1_707_287_400,
            message_type: None,
        };
        prop_assert!(request.validate_shape().is_err());
    }
}
