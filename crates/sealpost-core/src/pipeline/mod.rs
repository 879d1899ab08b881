//! The two forwarding pipelines.
//!
//! [`DevicePipeline`] runs where messages are captured: it gates, seals,
//! and submits. [`ServerPipeline`] runs where they are received: it
//! verifies, checks freshness, decrypts, deduplicates, and delivers.
//! Each step that can reject does so before any later step runs, and the
//! cheap checks come first.

mod device;
mod server;

pub use device::{DeviceOutcome, DevicePipeline, DropReason};
pub use server::{PipelineOutcome, ServerPipeline};
