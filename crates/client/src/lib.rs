//! HTTP implementation of [`cortexclaw_core::MemoryApi`] for the Cortex API.

pub mod client;
mod wire;

pub use client::{CortexClient, INGEST_INSTRUCTIONS};
