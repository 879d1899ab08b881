//! Sealpost device-side client.
//!
//! Wraps the device pipeline with an HTTP transport and wall-clock time:
//! the shape a capture integration embeds. The `sealpost-send` binary is
//! the same wiring driven from the command line.

#![forbid(unsafe_code)]

pub mod transport;

use sealpost_core::{DeviceOutcome, DevicePipeline, ForwardError, GateConfig, SystemClock};
use sealpost_crypto::EnvelopeKeys;

pub use transport::HttpTransport;

/// Device-side forwarder bound to one server.
pub struct DeviceForwarder {
    pipeline: DevicePipeline<HttpTransport, SystemClock>,
}

impl DeviceForwarder {
    /// Build a forwarder for `server_url` with the given keys and gates.
    ///
    /// # Errors
    ///
    /// [`ForwardError`] when the gate configuration is invalid or the
    /// transport cannot be built.
    pub fn new(
        server_url: &str,
        keys: EnvelopeKeys,
        config: GateConfig,
    ) -> Result<Self, ForwardError> {
        let transport = HttpTransport::new(server_url)
            .map_err(sealpost_core::DeliveryError::from)?;
        let pipeline = DevicePipeline::new(keys, config, transport, SystemClock)?;
        Ok(Self { pipeline })
    }

    /// Gate, seal, and submit one captured message.
    ///
    /// # Errors
    ///
    /// [`ForwardError`] when submission fails; gate drops are an
    /// [`DeviceOutcome::Dropped`] outcome, not an error.
    pub async fn forward(&self, sender: &str, body: &str) -> Result<DeviceOutcome, ForwardError> {
        self.pipeline.forward(sender, body).await
    }
}
