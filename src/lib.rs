//! Coin booth firmware library.
//!
//! Exposes the pure-logic modules (pulse aggregation, dispatch, provisioning,
//! boot flow) for integration testing. All ESP-IDF-specific code is guarded
//! by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod isr_lock;
pub mod pulse;
pub mod scheduler;
pub mod template;

pub mod pins;

// The adapters and drivers carry simulation backends on the host, so the
// crate builds and tests without ESP-IDF.
pub mod adapters;
pub mod drivers;
