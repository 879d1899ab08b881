//! Sealpost server binary.
//!
//! # Usage
//!
//! ```bash
//! # Keys and provider credentials come from the environment
//! export SEALPOST_AES_KEY=<64 hex chars>
//! export SEALPOST_MAC_KEY=<64 hex chars>
//! export SEALPOST_WHATSAPP_TOKEN=...
//! export SEALPOST_WHATSAPP_PHONE_ID=...
//! export SEALPOST_WHATSAPP_RECIPIENT=+15550001111
//!
//! sealpost-server --bind 0.0.0.0:8080
//! ```

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use clap::Parser;
use sealpost_core::{
    Delivery, DeliveryError, DeliveryReceipt, MemoryTtlStore, ServerPipeline, SystemClock,
    TemplateCatalog, TtlPolicy,
};
use sealpost_server::{AppState, WhatsAppDelivery, load_secrets, router, routes};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Sealpost receiving server
#[derive(Parser, Debug)]
#[command(name = "sealpost-server")]
#[command(about = "Receives sealed message envelopes and delivers notifications")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: String,

    /// Replay freshness window in seconds
    #[arg(long, default_value = "300")]
    replay_window: u64,

    /// Per-IP request limit per minute
    #[arg(long, default_value = "10")]
    rate_limit: u32,

    /// Dedup TTL for OTP messages, in seconds
    #[arg(long, default_value = "300")]
    otp_ttl: u64,

    /// Dedup TTL for transaction messages, in seconds
    #[arg(long, default_value = "600")]
    transaction_ttl: u64,

    /// Dedup TTL for bill messages, in seconds
    #[arg(long, default_value = "900")]
    bill_ttl: u64,

    /// Dedup TTL for security alerts, in seconds
    #[arg(long, default_value = "600")]
    security_ttl: u64,

    /// Seconds between dedup store sweeps
    #[arg(long, default_value = "60")]
    sweep_interval: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Stand-in delivery when no provider is configured: every send fails,
/// health reports degraded, but verification and dedup still run.
struct UnconfiguredDelivery;

#[async_trait]
impl Delivery for UnconfiguredDelivery {
    async fn send_template(
        &self,
        _template: &str,
        _params: &[String],
    ) -> Result<DeliveryReceipt, DeliveryError> {
        Err(DeliveryError::Network("no delivery provider configured".to_string()))
    }

    async fn healthy(&self) -> bool {
        false
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Sealpost server starting");

    let secrets = load_secrets()?;

    let delivery: Arc<dyn Delivery> = match secrets.whatsapp {
        Some(config) => Arc::new(WhatsAppDelivery::new(config)?),
        None => {
            tracing::warn!("No WhatsApp credentials configured - deliveries will fail");
            Arc::new(UnconfiguredDelivery)
        },
    };

    let ttl = TtlPolicy {
        otp: Duration::from_secs(args.otp_ttl),
        transaction: Duration::from_secs(args.transaction_ttl),
        bill: Duration::from_secs(args.bill_ttl),
        security: Duration::from_secs(args.security_ttl),
    };

    let clock = SystemClock;
    let pipeline = ServerPipeline::new(
        secrets.keys,
        MemoryTtlStore::new(clock.clone()),
        delivery,
        clock,
        TemplateCatalog::default(),
        ttl,
        args.replay_window,
    )?;

    let state = Arc::new(AppState::new(pipeline, args.rate_limit)?);
    routes::spawn_sweep(Arc::clone(&state), Duration::from_secs(args.sweep_interval));

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
