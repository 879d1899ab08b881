//! WhatsApp Business (Graph API) delivery adapter.

use std::time::Duration;

use async_trait::async_trait;
use sealpost_core::{Delivery, DeliveryError, DeliveryReceipt};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::WhatsAppConfig;

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v18.0";
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// [`Delivery`] implementation over the WhatsApp Business Cloud API.
///
/// One instance, one recipient: the configured number receives every
/// forwarded notification.
pub struct WhatsAppDelivery {
    client: reqwest::Client,
    config: WhatsAppConfig,
}

#[derive(Serialize)]
struct TemplateRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    template: TemplatePayload<'a>,
}

#[derive(Serialize)]
struct TemplatePayload<'a> {
    name: &'a str,
    language: Language,
    components: Vec<Component<'a>>,
}

#[derive(Serialize)]
struct Language {
    code: &'static str,
}

#[derive(Serialize)]
struct Component<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    parameters: Vec<Parameter<'a>>,
}

#[derive(Serialize)]
struct Parameter<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct SendResponse {
    messages: Vec<SentMessage>,
}

#[derive(Deserialize)]
struct SentMessage {
    id: String,
}

impl WhatsAppDelivery {
    /// Build a delivery adapter with its own connection pool.
    ///
    /// # Errors
    ///
    /// [`DeliveryError::Network`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: WhatsAppConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(|err| DeliveryError::Network(err.to_string()))?;
        Ok(Self { client, config })
    }

    fn send_url(&self) -> String {
        format!("{GRAPH_API_BASE}/{}/messages", self.config.phone_number_id)
    }
}

#[async_trait]
impl Delivery for WhatsAppDelivery {
    async fn send_template(
        &self,
        template: &str,
        params: &[String],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let body = TemplateRequest {
            messaging_product: "whatsapp",
            to: &self.config.recipient,
            kind: "template",
            template: TemplatePayload {
                name: template,
                language: Language { code: "en" },
                components: vec![Component {
                    kind: "body",
                    parameters: params
                        .iter()
                        .map(|text| Parameter { kind: "text", text })
                        .collect(),
                }],
            },
        };

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(&self.config.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    DeliveryError::Timeout
                } else {
                    DeliveryError::Network(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Provider error bodies can echo template parameters; log
            // only the status.
            warn!(status = status.as_u16(), "WhatsApp API rejected send");
            return Err(DeliveryError::Api { status: status.as_u16() });
        }

        let parsed: SendResponse = response
            .json()
            .await
            .map_err(|err| DeliveryError::Network(err.to_string()))?;
        let message_id = parsed
            .messages
            .into_iter()
            .next()
            .map(|m| m.id)
            .unwrap_or_default();

        Ok(DeliveryReceipt { message_id })
    }

    async fn healthy(&self) -> bool {
        // Credentials present and the client built; a live probe against
        // the Graph API would burn quota on every health check.
        !self.config.access_token.is_empty() && !self.config.phone_number_id.is_empty()
    }
}
