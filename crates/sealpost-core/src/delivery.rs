//! Outbound delivery and transport seams.
//!
//! [`Delivery`] is the server's downstream edge (template messages out to
//! the recipient channel); [`Transport`] is the device's upstream edge
//! (sealed envelopes in to the server). Both are trait objects so tests
//! substitute in-memory fakes and drive the pipelines without a network.

use async_trait::async_trait;
use sealpost_proto::{ForwardRequest, ForwardResponse};
use thiserror::Error;

/// Downstream delivery failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The provider did not answer in time.
    #[error("delivery timed out")]
    Timeout,

    /// The provider answered with a non-success status.
    #[error("delivery API returned status {status}")]
    Api {
        /// HTTP status from the provider.
        status: u16,
    },

    /// Connection-level failure before any response.
    #[error("delivery network error: {0}")]
    Network(String),
}

impl DeliveryError {
    /// True when retrying the same send could succeed.
    ///
    /// A definitive provider rejection is not retriable; timeouts and
    /// connection failures are.
    #[must_use]
    pub fn retriable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }
}

/// Provider acknowledgement for one delivered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Provider-assigned message identifier.
    pub message_id: String,
}

/// Downstream channel that carries rendered template messages.
#[async_trait]
pub trait Delivery: Send + Sync {
    /// Send one template message with positional parameters.
    ///
    /// # Errors
    ///
    /// [`DeliveryError`] on timeout, provider rejection, or network
    /// failure.
    async fn send_template(
        &self,
        template: &str,
        params: &[String],
    ) -> Result<DeliveryReceipt, DeliveryError>;

    /// True when the channel is configured and believed reachable.
    async fn healthy(&self) -> bool;
}

/// Upstream submission failure, as seen from the device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The server did not answer in time.
    #[error("submission timed out")]
    Timeout,

    /// The server rejected the request.
    #[error("server rejected submission with status {status}")]
    Rejected {
        /// HTTP status from the server.
        status: u16,
    },

    /// Connection-level failure before any response.
    #[error("transport network error: {0}")]
    Network(String),
}

/// Upstream channel that carries sealed envelopes to the server.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Submit one forward request.
    ///
    /// # Errors
    ///
    /// [`TransportError`] on timeout, rejection, or network failure.
    async fn submit(&self, request: &ForwardRequest) -> Result<ForwardResponse, TransportError>;
}

#[async_trait]
impl<T: Delivery + ?Sized> Delivery for std::sync::Arc<T> {
    async fn send_template(
        &self,
        template: &str,
        params: &[String],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        (**self).send_template(template, params).await
    }

    async fn healthy(&self) -> bool {
        (**self).healthy().await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn submit(&self, request: &ForwardRequest) -> Result<ForwardResponse, TransportError> {
        (**self).submit(request).await
    }
}

impl From<TransportError> for DeliveryError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Timeout,
            TransportError::Rejected { status } => Self::Api { status },
            TransportError::Network(detail) => Self::Network(detail),
        }
    }
}
