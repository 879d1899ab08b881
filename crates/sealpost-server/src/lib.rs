//! Sealpost receiving server.
//!
//! Accepts sealed envelopes over HTTP, runs them through the server
//! pipeline, and delivers notifications through the WhatsApp Business
//! API. See the crate binaries for startup wiring.

#![forbid(unsafe_code)]

pub mod config;
pub mod routes;
pub mod whatsapp;

pub use config::{Secrets, WhatsAppConfig, load_secrets};
pub use routes::{AppState, Pipeline, router, spawn_sweep};
pub use whatsapp::WhatsAppDelivery;
