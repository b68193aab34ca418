//! Shell configuration parameters
//!
//! Timing and buffer tunables for the AMG8833 shell. The defaults match the
//! pacing the sensor needs (10 fps internal rate, 1 s between reports).
//! The host simulator can override them from a JSON file.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::shell::MAX_LINE_CAPACITY;

/// Core shell configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    // --- Continuous modes ---
    /// Pause after device init before the first iteration (milliseconds)
    pub settle_delay_ms: u32,
    /// Pause after every reported iteration (milliseconds)
    pub report_interval_ms: u32,

    // --- Transport ---
    /// Pause between transport polls in the shell loop (milliseconds)
    pub poll_interval_ms: u32,
    /// Receive line buffer capacity (bytes)
    pub max_line_len: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1000,
            report_interval_ms: 1000,
            poll_interval_ms: 100,
            max_line_len: 256,
        }
    }
}

impl ShellConfig {
    /// Reject values the shell loop cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_line_len == 0 || self.max_line_len > MAX_LINE_CAPACITY {
            return Err(Error::Config("max_line_len out of range"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be non-zero"));
        }
        Ok(())
    }
}
