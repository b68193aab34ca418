//! Unified error types for the AMG8833 command shell.
//!
//! A single `Error` enum that every layer converts into, so the dispatcher
//! can map any failure onto the shell's numeric status scheme in one place.
//! All variants are `Copy`; nothing here allocates.

use core::fmt;

use crate::shell::ShellStatus;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the shell funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Bad, missing or unrecognised command arguments.
    InvalidParam(&'static str),
    /// The sensor could not be brought up (basic or interrupt mode).
    DeviceInit(DriverError),
    /// A read inside an active continuous loop failed.
    DeviceRead(DriverError),
    /// The INT line could not be enabled, so interrupts cannot be relied on.
    InterruptSetup(LineError),
    /// One of the driver's self-test routines reported a failure.
    TestFailed(DriverError),
    /// The transport writer refused output.
    Output,
    /// Configuration is invalid.
    Config(&'static str),
}

impl Error {
    /// Shell status code this error terminates with.
    pub const fn status(&self) -> ShellStatus {
        match self {
            Self::InvalidParam(_) | Self::Config(_) => ShellStatus::InvalidParam,
            Self::DeviceInit(_)
            | Self::DeviceRead(_)
            | Self::InterruptSetup(_)
            | Self::TestFailed(_)
            | Self::Output => ShellStatus::RunFailed,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParam(msg) => write!(f, "invalid param: {msg}"),
            Self::DeviceInit(e) => write!(f, "device init: {e}"),
            Self::DeviceRead(e) => write!(f, "device read: {e}"),
            Self::InterruptSetup(e) => write!(f, "interrupt setup: {e}"),
            Self::TestFailed(e) => write!(f, "test failed: {e}"),
            Self::Output => write!(f, "output write failed"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self::Output
    }
}

impl From<LineError> for Error {
    fn from(e: LineError) -> Self {
        Self::InterruptSetup(e)
    }
}

// ---------------------------------------------------------------------------
// Driver capability errors
// ---------------------------------------------------------------------------

/// Failures reported by the sensor driver capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    /// I2C transfer failed or was NAKed.
    Bus,
    /// Operation requires an initialised handle.
    NotInitialized,
    /// Register read-back did not match what was written.
    Verify,
    /// The chip did not become ready in time.
    Timeout,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus error"),
            Self::NotInitialized => write!(f, "driver not initialised"),
            Self::Verify => write!(f, "register verify mismatch"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

// ---------------------------------------------------------------------------
// Interrupt line errors
// ---------------------------------------------------------------------------

/// Failures while configuring the GPIO edge interrupt. Carries the platform
/// return code where there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineError {
    IsrInstallFailed(i32),
    EnableFailed(i32),
    DisableFailed(i32),
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR install failed (rc={})", rc),
            Self::EnableFailed(rc) => write!(f, "GPIO interrupt enable failed (rc={})", rc),
            Self::DisableFailed(rc) => write!(f, "GPIO interrupt disable failed (rc={})", rc),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
