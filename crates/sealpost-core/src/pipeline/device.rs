//! Device-side pipeline: gate, seal, submit.

use sealpost_crypto::{EnvelopeKeys, seal};
use sealpost_proto::{ForwardRequest, ForwardResponse, MessageCategory};
use tracing::{debug, info};

use crate::{
    classify::{Classification, classify},
    clock::Clock,
    config::GateConfig,
    delivery::{DeliveryError, Transport},
    error::ForwardError,
};

/// Why a message was not forwarded. All of these are normal outcomes,
/// not errors: the gates exist to drop traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The global forwarding switch is off.
    Disabled,
    /// Sender is not on the configured allowlist.
    SenderNotAllowed,
    /// Outside the active-hours window and no manual override.
    OutsideWindow,
    /// The user switched this category off.
    CategoryDisabled(MessageCategory),
}

/// Result of running one message through the device pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// The message passed every gate and the server accepted it.
    Forwarded {
        /// Server acknowledgement.
        response: ForwardResponse,
    },
    /// A gate dropped the message before any network activity.
    Dropped(DropReason),
}

/// Captures a message, runs the forwarding gates, and submits a sealed
/// envelope when they all pass.
///
/// Gates run before sealing: a dropped message never touches the crypto
/// layer or the network, and its content never leaves the process.
pub struct DevicePipeline<T: Transport, C: Clock> {
    keys: EnvelopeKeys,
    config: GateConfig,
    transport: T,
    clock: C,
}

impl<T: Transport, C: Clock> DevicePipeline<T, C> {
    /// Build a pipeline after validating the gate configuration.
    ///
    /// # Errors
    ///
    /// [`ForwardError::Config`] when the gate configuration is invalid.
    pub fn new(
        keys: EnvelopeKeys,
        config: GateConfig,
        transport: T,
        clock: C,
    ) -> Result<Self, ForwardError> {
        config.validate()?;
        Ok(Self { keys, config, transport, clock })
    }

    /// Run the forwarding gates for one message, in fixed order.
    ///
    /// Pure: reads only its arguments, so gate behavior is testable
    /// without a transport or real time.
    fn evaluate_gates(
        body: &str,
        sender: &str,
        config: &GateConfig,
        now_unix: u64,
    ) -> Result<Classification, DropReason> {
        if !config.enabled {
            return Err(DropReason::Disabled);
        }
        if !config.sender_allowed(sender) {
            return Err(DropReason::SenderNotAllowed);
        }
        if !config.within_window(now_unix) {
            return Err(DropReason::OutsideWindow);
        }

        let classification = classify(body);
        if !config.category_enabled(classification.category) {
            return Err(DropReason::CategoryDisabled(classification.category));
        }
        Ok(classification)
    }

    /// Gate, seal, and submit one captured message.
    ///
    /// The submitted request carries the device's classification as an
    /// advisory hint; the server re-classifies and never trusts it.
    ///
    /// # Errors
    ///
    /// - [`ForwardError::Delivery`] when the server is unreachable or
    ///   rejects the submission
    /// - [`ForwardError::Config`] when sealing fails on bad key material
    pub async fn forward(&self, sender: &str, body: &str) -> Result<DeviceOutcome, ForwardError> {
        let now = self.clock.now_unix();
        let classification = match Self::evaluate_gates(body, sender, &self.config, now) {
            Ok(classification) => classification,
            Err(reason) => {
                debug!(?reason, sender, "message dropped by forwarding gate");
                return Ok(DeviceOutcome::Dropped(reason));
            },
        };

        let envelope = seal(body.as_bytes(), &self.keys)?;
        let request = ForwardRequest {
            encrypted_payload: envelope.encoded_payload,
            hmac_signature: envelope.signature,
            sender: sender.to_string(),
            timestamp: now,
            message_type: Some(classification.category),
        };

        let response =
            self.transport.submit(&request).await.map_err(DeliveryError::from)?;

        info!(
            category = %classification.category,
            urgency = %classification.urgency,
            sender,
            "message forwarded"
        );
        Ok(DeviceOutcome::Forwarded { response })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use super::*;
    use crate::{clock::ManualClock, config::HourWindow, delivery::TransportError};

    /// Transport fake recording every submitted request.
    struct RecordingTransport {
        requests: Mutex<Vec<ForwardRequest>>,
    }

    impl RecordingTransport {
        fn new() -> Self {
            Self { requests: Mutex::new(Vec::new()) }
        }

        fn submitted(&self) -> Vec<ForwardRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for &RecordingTransport {
        async fn submit(
            &self,
            request: &ForwardRequest,
        ) -> Result<ForwardResponse, TransportError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(ForwardResponse {
                success: true,
                message: "accepted".to_string(),
                delivery_id: Some("wamid.1".to_string()),
            })
        }
    }

    fn test_keys() -> EnvelopeKeys {
        EnvelopeKeys::new([1u8; 32], [2u8; 32]).unwrap()
    }

    fn pipeline<'a>(
        config: GateConfig,
        transport: &'a RecordingTransport,
        clock: ManualClock,
    ) -> DevicePipeline<&'a RecordingTransport, ManualClock> {
        DevicePipeline::new(test_keys(), config, transport, clock).unwrap()
    }

    #[tokio::test]
    async fn forwards_when_all_gates_pass() {
        let transport = RecordingTransport::new();
        let p = pipeline(GateConfig::default(), &transport, ManualClock::new(1000));

        let outcome = p.forward("BANK-ALERT", "Your OTP is 4821").await.unwrap();
        assert!(matches!(outcome, DeviceOutcome::Forwarded { .. }));

        let sent = transport.submitted();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].sender, "BANK-ALERT");
        assert_eq!(sent[0].timestamp, 1000);
        assert_eq!(sent[0].message_type, Some(MessageCategory::Otp));
        // Content never travels in the clear.
        assert!(!sent[0].encrypted_payload.contains("4821"));
    }

    #[tokio::test]
    async fn disabled_switch_drops_everything() {
        let transport = RecordingTransport::new();
        let config = GateConfig { enabled: false, ..GateConfig::default() };
        let p = pipeline(config, &transport, ManualClock::new(1000));

        let outcome = p.forward("BANK", "Your OTP is 4821").await.unwrap();
        assert_eq!(outcome, DeviceOutcome::Dropped(DropReason::Disabled));
        assert!(transport.submitted().is_empty());
    }

    #[tokio::test]
    async fn allowlist_gates_sender() {
        let transport = RecordingTransport::new();
        let config =
            GateConfig { allowlist: vec!["BANK-ALERT".to_string()], ..GateConfig::default() };
        let p = pipeline(config, &transport, ManualClock::new(1000));

        let outcome = p.forward("SPAM-CO", "win a prize 123456 code").await.unwrap();
        assert_eq!(outcome, DeviceOutcome::Dropped(DropReason::SenderNotAllowed));
        assert!(transport.submitted().is_empty());
    }

    #[tokio::test]
    async fn hour_window_gates_forwarding() {
        let transport = RecordingTransport::new();
        let config = GateConfig {
            hours: Some(HourWindow { start_hour: 9, end_hour: 17 }),
            ..GateConfig::default()
        };
        // 03:00 UTC.
        let p = pipeline(config, &transport, ManualClock::new(3 * 3600));

        let outcome = p.forward("BANK", "Your OTP is 4821").await.unwrap();
        assert_eq!(outcome, DeviceOutcome::Dropped(DropReason::OutsideWindow));
    }

    #[tokio::test]
    async fn disabled_category_is_dropped_after_classification() {
        let transport = RecordingTransport::new();
        let config = GateConfig {
            disabled_categories: vec![MessageCategory::Bill],
            ..GateConfig::default()
        };
        let p = pipeline(config, &transport, ManualClock::new(1000));

        let outcome = p.forward("POWERCO", "Bill of Rs.1450 due on 05-Mar").await.unwrap();
        assert_eq!(
            outcome,
            DeviceOutcome::Dropped(DropReason::CategoryDisabled(MessageCategory::Bill))
        );

        // Other categories still pass.
        let outcome = p.forward("BANK", "Your OTP is 4821").await.unwrap();
        assert!(matches!(outcome, DeviceOutcome::Forwarded { .. }));
    }

    #[tokio::test]
    async fn transport_failure_is_an_error_not_a_drop() {
        struct FailingTransport;

        #[async_trait]
        impl Transport for FailingTransport {
            async fn submit(
                &self,
                _request: &ForwardRequest,
            ) -> Result<ForwardResponse, TransportError> {
                Err(TransportError::Timeout)
            }
        }

        let p = DevicePipeline::new(
            test_keys(),
            GateConfig::default(),
            FailingTransport,
            ManualClock::new(1000),
        )
        .unwrap();

        let err = p.forward("BANK", "Your OTP is 4821").await.unwrap_err();
        assert!(matches!(err, ForwardError::Delivery(DeliveryError::Timeout)));
    }
}
