//! Server configuration from environment variables.
//!
//! Key material and provider credentials come only from the environment,
//! never from flags: flags show up in process listings.

use sealpost_core::ConfigError;
use sealpost_crypto::EnvelopeKeys;

/// Environment variable names.
const ENV_AES_KEY: &str = "SEALPOST_AES_KEY";
const ENV_MAC_KEY: &str = "SEALPOST_MAC_KEY";
const ENV_WA_TOKEN: &str = "SEALPOST_WHATSAPP_TOKEN";
const ENV_WA_PHONE_ID: &str = "SEALPOST_WHATSAPP_PHONE_ID";
const ENV_WA_RECIPIENT: &str = "SEALPOST_WHATSAPP_RECIPIENT";

/// WhatsApp Business API credentials.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Graph API bearer token.
    pub access_token: String,
    /// Business phone number ID (the sending number).
    pub phone_number_id: String,
    /// Recipient phone number in international format.
    pub recipient: String,
}

/// Everything the server needs that is secret or deployment-specific.
pub struct Secrets {
    /// Envelope keys shared with the devices.
    pub keys: EnvelopeKeys,
    /// Delivery provider credentials, absent in degraded deployments.
    pub whatsapp: Option<WhatsAppConfig>,
}

/// Load secrets from the environment.
///
/// The two envelope keys are required; WhatsApp credentials are optional
/// so the server can come up (and report degraded health) before the
/// provider is wired in.
///
/// # Errors
///
/// [`ConfigError`] when a key variable is missing, not 64 hex chars, or
/// the two keys are equal.
pub fn load_secrets() -> Result<Secrets, ConfigError> {
    let aes_hex = require(ENV_AES_KEY)?;
    let mac_hex = require(ENV_MAC_KEY)?;
    let keys = EnvelopeKeys::from_hex(&aes_hex, &mac_hex).map_err(|err| match err {
        sealpost_crypto::CryptoError::IdenticalKeys => {
            ConfigError::InvalidKeyMaterial("AES and MAC keys must differ")
        },
        _ => ConfigError::InvalidKeyMaterial("expected 64 hex characters per key"),
    })?;

    let whatsapp = match (
        std::env::var(ENV_WA_TOKEN).ok(),
        std::env::var(ENV_WA_PHONE_ID).ok(),
        std::env::var(ENV_WA_RECIPIENT).ok(),
    ) {
        (Some(access_token), Some(phone_number_id), Some(recipient)) => {
            Some(WhatsAppConfig { access_token, phone_number_id, recipient })
        },
        (None, None, None) => None,
        // Partial credentials are a deployment mistake, not a degraded mode.
        _ => return Err(ConfigError::InvalidSetting("incomplete WhatsApp credentials")),
    };

    Ok(Secrets { keys, whatsapp })
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingSetting(name))
}
