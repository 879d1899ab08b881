//! `sealpost-send`: forward one message from the command line.
//!
//! # Usage
//!
//! ```bash
//! export SEALPOST_AES_KEY=<64 hex chars>
//! export SEALPOST_MAC_KEY=<64 hex chars>
//!
//! sealpost-send --server http://127.0.0.1:8080 \
//!     --sender BANK-ALERT "Your OTP is 482913"
//! ```

use clap::Parser;
use sealpost_client::DeviceForwarder;
use sealpost_core::{DeviceOutcome, GateConfig};
use sealpost_crypto::EnvelopeKeys;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Forward one message through a Sealpost server
#[derive(Parser, Debug)]
#[command(name = "sealpost-send")]
#[command(about = "Seals a message and submits it to a Sealpost server")]
#[command(version)]
struct Args {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Sender label to attach (e.g. the SMS sender ID)
    #[arg(long)]
    sender: String,

    /// Message body to forward
    body: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn key_from_env(name: &'static str) -> Result<String, String> {
    std::env::var(name).map_err(|_| format!("{name} is not set"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let aes_hex = key_from_env("SEALPOST_AES_KEY")?;
    let mac_hex = key_from_env("SEALPOST_MAC_KEY")?;
    let keys = EnvelopeKeys::from_hex(&aes_hex, &mac_hex)?;

    let forwarder = DeviceForwarder::new(&args.server, keys, GateConfig::default())?;

    match forwarder.forward(&args.sender, &args.body).await? {
        DeviceOutcome::Forwarded { response } => {
            tracing::info!(
                delivery_id = response.delivery_id.as_deref().unwrap_or("none"),
                "{}",
                response.message
            );
        },
        DeviceOutcome::Dropped(reason) => {
            tracing::warn!(?reason, "message dropped before submission");
        },
    }

    Ok(())
}
