//! Sealpost core protocol logic.
//!
//! Everything between the wire and the delivery collaborator: message
//! classification, replay protection, the expiring dedup store, template
//! selection, and the device- and server-side forwarding pipelines.
//!
//! # Architecture
//!
//! Protocol logic is pure wherever possible. Time comes from the [`Clock`]
//! trait (production: [`SystemClock`]; tests: [`ManualClock`] with virtual
//! time), the dedup store sits behind the [`TtlStore`] capability trait,
//! and the external collaborators are the [`Delivery`] and [`Transport`]
//! traits. The pipelines orchestrate; they own no I/O of their own.
//!
//! # Security
//!
//! - The classifier runs on both sides from one shared rule table, so
//!   device filtering and server template selection cannot drift.
//! - The server pipeline verifies the envelope HMAC before the replay
//!   check and decrypts only after both pass (fail closed, fail fast).
//! - No log statement in this crate ever includes message content, key
//!   material, or signature bytes, only categories, senders, sizes, and
//!   error kinds.

#![forbid(unsafe_code)]

pub mod classify;
pub mod clock;
pub mod config;
pub mod delivery;
pub mod error;
pub mod pipeline;
pub mod replay;
pub mod store;
pub mod template;

pub(crate) mod text;

pub use classify::{Classification, RULE_TABLE_VERSION, classify};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GateConfig, HourWindow};
pub use delivery::{Delivery, DeliveryError, DeliveryReceipt, Transport, TransportError};
pub use error::ForwardError;
pub use pipeline::{
    DeviceOutcome, DevicePipeline, DropReason, PipelineOutcome, ServerPipeline,
};
pub use replay::{DEFAULT_REPLAY_WINDOW_SECS, ReplayError};
pub use store::{MemoryTtlStore, TtlPolicy, TtlStore};
pub use template::{TemplateCatalog, TemplateMessage};
