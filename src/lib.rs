//! AMG8833 shell library.
//!
//! Exposes the dispatcher, the interrupt bridge, the shell and the drivers
//! for the binary and for integration testing. ESP-IDF-specific code is
//! guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod irq;
pub mod pins;
pub mod shell;

pub use error::{Error, Result};
