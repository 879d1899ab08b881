//! HTTP transport to the receiving server.

use std::time::Duration;

use async_trait::async_trait;
use sealpost_core::{Transport, TransportError};
use sealpost_proto::{ForwardRequest, ForwardResponse};

const SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`Transport`] over HTTP, posting to the server's ingestion endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport for `server_url` (scheme and host, no path).
    ///
    /// # Errors
    ///
    /// [`TransportError::Network`] if the HTTP client cannot be built.
    pub fn new(server_url: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(SUBMIT_TIMEOUT)
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))?;
        let endpoint = format!("{}/forward-message", server_url.trim_end_matches('/'));
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, request: &ForwardRequest) -> Result<ForwardResponse, TransportError> {
        let response =
            self.client.post(&self.endpoint).json(request).send().await.map_err(|err| {
                if err.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected { status: status.as_u16() });
        }

        response.json().await.map_err(|err| TransportError::Network(err.to_string()))
    }
}
