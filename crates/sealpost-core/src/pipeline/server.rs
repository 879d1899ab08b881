//! Server-side pipeline: verify, check freshness, decrypt, dedup, deliver.

use sealpost_crypto::{EnvelopeKeys, SealedEnvelope, fingerprint};
use sealpost_proto::ForwardRequest;
use tracing::{debug, info};

use crate::{
    classify::classify,
    clock::Clock,
    delivery::Delivery,
    error::ForwardError,
    replay,
    store::{TtlPolicy, TtlStore},
    template::TemplateCatalog,
};

/// Result of handling one accepted forward request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    /// Server-derived category (never the device hint).
    pub category: sealpost_proto::MessageCategory,
    /// True when the dedup store had already seen this message; nothing
    /// was delivered.
    pub duplicate: bool,
    /// Provider message ID when a delivery happened.
    pub delivery_id: Option<String>,
}

/// Receives sealed envelopes and turns them into delivered notifications.
///
/// Processing order is fixed and security-relevant: shape validation,
/// HMAC verification, replay window, decryption, classification, dedup,
/// delivery. Nothing downstream of a failed step ever runs, and the
/// untrusted `message_type` hint influences none of it.
pub struct ServerPipeline<S: TtlStore, D: Delivery, C: Clock> {
    keys: EnvelopeKeys,
    store: S,
    delivery: D,
    clock: C,
    templates: TemplateCatalog,
    ttl: TtlPolicy,
    replay_window_secs: u64,
}

impl<S: TtlStore, D: Delivery, C: Clock> ServerPipeline<S, D, C> {
    /// Build a pipeline after validating the TTL policy.
    ///
    /// # Errors
    ///
    /// [`ForwardError::Config`] when the TTL policy or replay window is
    /// invalid.
    pub fn new(
        keys: EnvelopeKeys,
        store: S,
        delivery: D,
        clock: C,
        templates: TemplateCatalog,
        ttl: TtlPolicy,
        replay_window_secs: u64,
    ) -> Result<Self, ForwardError> {
        ttl.validate()?;
        if replay_window_secs == 0 {
            return Err(crate::config::ConfigError::InvalidReplayWindow.into());
        }
        Ok(Self { keys, store, delivery, clock, templates, ttl, replay_window_secs })
    }

    /// Handle one forward request end to end.
    ///
    /// Duplicates are a success (`duplicate: true`, no delivery): the
    /// device retrying a request it never got an answer for must not
    /// produce a second notification.
    ///
    /// # Errors
    ///
    /// [`ForwardError`] naming the first failed step. Authentication
    /// failures are reported identically whether the HMAC or the GCM tag
    /// failed.
    pub async fn handle(&self, request: &ForwardRequest) -> Result<PipelineOutcome, ForwardError> {
        request.validate_shape()?;

        let envelope =
            SealedEnvelope::from_wire(&*request.encrypted_payload, &*request.hmac_signature);
        let verified = envelope.verify(&self.keys)?;

        // The timestamp is covered by nothing but the freshness window,
        // and it is only consulted after the HMAC proves the sender holds
        // the MAC key.
        replay::validate(request.timestamp, self.clock.now_unix(), self.replay_window_secs)?;

        let plaintext = verified.decrypt(&self.keys)?;
        let body = std::str::from_utf8(&plaintext).map_err(|_| ForwardError::Malformed)?;

        let classification = classify(body);
        if let Some(hint) = request.message_type {
            if hint != classification.category {
                debug!(
                    hint = %hint,
                    derived = %classification.category,
                    "device classification hint diverges, using server result"
                );
            }
        }

        let key = fingerprint(&request.sender, body.as_bytes());
        let ttl = self.ttl.for_category(classification.category);
        if !self.store.put_if_absent(&key, &request.sender, ttl) {
            info!(category = %classification.category, "duplicate message suppressed");
            return Ok(PipelineOutcome {
                category: classification.category,
                duplicate: true,
                delivery_id: None,
            });
        }

        // The fingerprint stays committed even if delivery now fails:
        // retrying a failed send is the operator's call, not an excuse to
        // double-notify on the next device retry.
        let rendered = self.templates.render(classification.category, &request.sender, body);
        let receipt = self.delivery.send_template(&rendered.template, &rendered.params).await?;

        info!(
            category = %classification.category,
            urgency = %classification.urgency,
            sender = %request.sender,
            "message delivered"
        );
        Ok(PipelineOutcome {
            category: classification.category,
            duplicate: false,
            delivery_id: Some(receipt.message_id),
        })
    }

    /// Drop expired dedup entries. Called from the periodic sweep task.
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired()
    }

    /// True when the delivery channel reports itself ready.
    pub async fn delivery_healthy(&self) -> bool {
        self.delivery.healthy().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    };

    use async_trait::async_trait;
    use sealpost_proto::MessageCategory;

    use super::*;
    use crate::{
        clock::ManualClock,
        delivery::{DeliveryError, DeliveryReceipt},
        store::MemoryTtlStore,
        template::TemplateMessage,
    };

    /// Delivery fake recording every rendered message.
    struct RecordingDelivery {
        sent: Mutex<Vec<TemplateMessage>>,
        counter: AtomicU64,
    }

    impl RecordingDelivery {
        fn new() -> Self {
            Self { sent: Mutex::new(Vec::new()), counter: AtomicU64::new(0) }
        }

        fn messages(&self) -> Vec<TemplateMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Delivery for &RecordingDelivery {
        async fn send_template(
            &self,
            template: &str,
            params: &[String],
        ) -> Result<DeliveryReceipt, DeliveryError> {
            self.sent.lock().unwrap().push(TemplateMessage {
                template: template.to_string(),
                params: params.to_vec(),
            });
            let n = self.counter.fetch_add(1, Ordering::SeqCst);
            Ok(DeliveryReceipt { message_id: format!("wamid.{n}") })
        }

        async fn healthy(&self) -> bool {
            true
        }
    }

    fn test_keys() -> EnvelopeKeys {
        EnvelopeKeys::new([1u8; 32], [2u8; 32]).unwrap()
    }

    fn sealed_request(sender: &str, body: &str, timestamp: u64) -> ForwardRequest {
        let envelope = sealpost_crypto::seal(body.as_bytes(), &test_keys()).unwrap();
        ForwardRequest {
            encrypted_payload: envelope.encoded_payload,
            hmac_signature: envelope.signature,
            sender: sender.to_string(),
            timestamp,
            message_type: None,
        }
    }

    fn pipeline<'a>(
        delivery: &'a RecordingDelivery,
        clock: ManualClock,
    ) -> ServerPipeline<MemoryTtlStore<ManualClock>, &'a RecordingDelivery, ManualClock> {
        ServerPipeline::new(
            test_keys(),
            MemoryTtlStore::new(clock.clone()),
            delivery,
            clock,
            TemplateCatalog::default(),
            TtlPolicy::default(),
            300,
        )
        .unwrap()
    }

    const NOW: u64 = 1_707_287_400;

    #[tokio::test]
    async fn delivers_otp_end_to_end() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let request = sealed_request("BANK-ALERT", "Your OTP is 482913", NOW);
        let outcome = p.handle(&request).await.unwrap();

        assert_eq!(outcome.category, MessageCategory::Otp);
        assert!(!outcome.duplicate);
        assert_eq!(outcome.delivery_id, Some("wamid.0".to_string()));

        let sent = delivery.messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, "otp_notification");
        assert_eq!(sent[0].params, vec!["BANK-ALERT".to_string(), "482913".to_string()]);
    }

    #[tokio::test]
    async fn duplicate_is_suppressed_not_redelivered() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let request = sealed_request("BANK", "Your OTP is 4821", NOW);
        let first = p.handle(&request).await.unwrap();
        assert!(!first.duplicate);

        // Same content re-sealed: different ciphertext, same fingerprint.
        let retry = sealed_request("BANK", "Your OTP is 4821", NOW + 5);
        let second = p.handle(&retry).await.unwrap();
        assert!(second.duplicate);
        assert_eq!(second.delivery_id, None);

        assert_eq!(delivery.messages().len(), 1);
    }

    #[tokio::test]
    async fn dedup_expires_with_virtual_time() {
        let delivery = RecordingDelivery::new();
        let clock = ManualClock::new(NOW);
        let p = pipeline(&delivery, clock.clone());

        let request = sealed_request("BANK", "Your OTP is 4821", NOW);
        p.handle(&request).await.unwrap();

        // Past the 300s OTP TTL: same content is fresh again.
        clock.advance(301);
        let later = sealed_request("BANK", "Your OTP is 4821", NOW + 301);
        let outcome = p.handle(&later).await.unwrap();
        assert!(!outcome.duplicate);
        assert_eq!(delivery.messages().len(), 2);
    }

    #[tokio::test]
    async fn same_body_different_sender_is_not_a_duplicate() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        p.handle(&sealed_request("BANK-A", "Your OTP is 4821", NOW)).await.unwrap();
        let outcome = p.handle(&sealed_request("BANK-B", "Your OTP is 4821", NOW)).await.unwrap();
        assert!(!outcome.duplicate);
        assert_eq!(delivery.messages().len(), 2);
    }

    #[tokio::test]
    async fn stale_timestamp_rejected_before_decrypt() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let request = sealed_request("BANK", "Your OTP is 4821", NOW - 301);
        let err = p.handle(&request).await.unwrap_err();
        assert!(matches!(err, ForwardError::Stale { age_secs: 301 }));
        assert!(delivery.messages().is_empty());
    }

    #[tokio::test]
    async fn window_boundary_is_accepted() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let request = sealed_request("BANK", "Your OTP is 4821", NOW - 300);
        assert!(p.handle(&request).await.is_ok());
    }

    #[tokio::test]
    async fn future_timestamp_rejected() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let request = sealed_request("BANK", "Your OTP is 4821", NOW + 301);
        let err = p.handle(&request).await.unwrap_err();
        assert!(matches!(err, ForwardError::FromFuture { skew_secs: 301 }));
    }

    #[tokio::test]
    async fn tampered_signature_is_authentication_failure() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let mut request = sealed_request("BANK", "Your OTP is 4821", NOW);
        let mut sig = request.hmac_signature.into_bytes();
        sig[0] = if sig[0] == b'0' { b'1' } else { b'0' };
        request.hmac_signature = String::from_utf8(sig).unwrap();

        let err = p.handle(&request).await.unwrap_err();
        assert!(matches!(err, ForwardError::Authentication));
        assert!(delivery.messages().is_empty());
    }

    #[tokio::test]
    async fn stale_check_runs_even_with_bad_ciphertext_order() {
        // A stale request with a valid signature must fail on staleness,
        // proving the replay check precedes decryption.
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let request = sealed_request("BANK", "Your OTP is 4821", NOW - 10_000);
        let err = p.handle(&request).await.unwrap_err();
        assert!(matches!(err, ForwardError::Stale { .. }));
    }

    #[tokio::test]
    async fn shape_violations_rejected_first() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let mut request = sealed_request("BANK", "hello", NOW);
        request.sender.clear();
        let err = p.handle(&request).await.unwrap_err();
        assert!(matches!(err, ForwardError::Malformed));
    }

    #[tokio::test]
    async fn non_utf8_plaintext_is_malformed() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let envelope = sealpost_crypto::seal(&[0xFF, 0xFE, 0x80], &test_keys()).unwrap();
        let request = ForwardRequest {
            encrypted_payload: envelope.encoded_payload,
            hmac_signature: envelope.signature,
            sender: "BANK".to_string(),
            timestamp: NOW,
            message_type: None,
        };
        let err = p.handle(&request).await.unwrap_err();
        assert!(matches!(err, ForwardError::Malformed));
    }

    #[tokio::test]
    async fn hint_divergence_does_not_change_result() {
        let delivery = RecordingDelivery::new();
        let p = pipeline(&delivery, ManualClock::new(NOW));

        let mut request = sealed_request("BANK", "Your OTP is 482913", NOW);
        // Lying hint: server must still derive OTP and use its template.
        request.message_type = Some(MessageCategory::Bill);

        let outcome = p.handle(&request).await.unwrap();
        assert_eq!(outcome.category, MessageCategory::Otp);
        assert_eq!(delivery.messages()[0].template, "otp_notification");
    }

    #[tokio::test]
    async fn delivery_failure_surfaces_but_commits_dedup() {
        struct FailingDelivery;

        #[async_trait]
        impl Delivery for FailingDelivery {
            async fn send_template(
                &self,
                _template: &str,
                _params: &[String],
            ) -> Result<DeliveryReceipt, DeliveryError> {
                Err(DeliveryError::Api { status: 500 })
            }

            async fn healthy(&self) -> bool {
                false
            }
        }

        let clock = ManualClock::new(NOW);
        let store = MemoryTtlStore::new(clock.clone());
        let p = ServerPipeline::new(
            test_keys(),
            store.clone(),
            FailingDelivery,
            clock,
            TemplateCatalog::default(),
            TtlPolicy::default(),
            300,
        )
        .unwrap();

        let request = sealed_request("BANK", "Your OTP is 4821", NOW);
        let err = p.handle(&request).await.unwrap_err();
        assert!(matches!(err, ForwardError::Delivery(DeliveryError::Api { status: 500 })));

        // The fingerprint stays committed.
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn zero_replay_window_is_a_config_error() {
        let delivery = RecordingDelivery::new();
        let clock = ManualClock::new(NOW);
        let result = ServerPipeline::new(
            test_keys(),
            MemoryTtlStore::new(clock.clone()),
            &delivery,
            clock,
            TemplateCatalog::default(),
            TtlPolicy::default(),
            0,
        );
        assert!(matches!(result, Err(ForwardError::Config(_))));
    }

    #[tokio::test]
    async fn purge_reports_sweep_counts() {
        let delivery = RecordingDelivery::new();
        let clock = ManualClock::new(NOW);
        let p = pipeline(&delivery, clock.clone());

        p.handle(&sealed_request("BANK", "Your OTP is 4821", NOW)).await.unwrap();
        assert_eq!(p.purge_expired(), 0);

        clock.advance(301);
        assert_eq!(p.purge_expired(), 1);
    }
}
