//! Port traits: the hexagonal boundary between the dispatcher and the outside world.
//!
//! ```text
//!   Driver / GPIO adapter ──▶ Port trait ──▶ Amg8833Command (dispatcher)
//! ```
//!
//! The sensor driver, the INT line and the delay source are all injected,
//! so the dispatcher and the interrupt bridge run unchanged against the
//! real chip, the host simulation, or recording mocks in tests.
//! Pauses use [`embedded_hal::delay::DelayNs`] directly.

use crate::app::commands::{DeviceAddress, InterruptParams};
use crate::error::{DriverError, LineError};
use crate::irq::bridge::IsrHandler;
use crate::irq::decoder::{InterruptStatus, ThresholdTable};

/// One full 8×8 temperature frame, row-major, degrees Celsius.
pub type Frame = [[f32; 8]; 8];

/// Static chip and driver description printed by `amg8833 -i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChipInfo {
    pub chip_name: &'static str,
    pub manufacturer_name: &'static str,
    pub interface: &'static str,
    /// `major * 1000 + minor * 100`.
    pub driver_version: u32,
    pub supply_voltage_min_v: f32,
    pub supply_voltage_max_v: f32,
    pub max_current_ma: f32,
    pub temperature_max: f32,
    pub temperature_min: f32,
}

/// Application callback the driver invokes (from interrupt context) with the
/// decoded cause of an INT assertion.
///
/// A plain function pointer: it cannot capture foreground state.
#[derive(Debug, Clone, Copy)]
pub struct StatusCallback(fn(InterruptStatus));

impl StatusCallback {
    pub const fn new(f: fn(InterruptStatus)) -> Self {
        Self(f)
    }

    #[inline]
    pub fn notify(self, status: InterruptStatus) {
        (self.0)(status);
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor driver capability
// ───────────────────────────────────────────────────────────────

/// Everything the shell consumes from the AMG8833 driver. The register
/// protocol behind it is the driver's business.
pub trait SensorDriver {
    /// Chip and driver description.
    fn info(&self) -> ChipInfo;

    // ── Self tests (own init/deinit) ─────────────────────────

    /// Register read/write self test.
    fn register_test(&mut self, addr: DeviceAddress) -> Result<(), DriverError>;

    /// Polled temperature read test, `times` iterations.
    fn read_test(&mut self, addr: DeviceAddress, times: u32) -> Result<(), DriverError>;

    /// Interrupt threshold test, `times` iterations. Expects the handler from
    /// [`interrupt_test_irq_handler`](Self::interrupt_test_irq_handler) to be
    /// armed on the INT line for its duration.
    fn interrupt_test(
        &mut self,
        addr: DeviceAddress,
        params: &InterruptParams,
        times: u32,
    ) -> Result<(), DriverError>;

    /// ISR entry servicing the chip while [`interrupt_test`](Self::interrupt_test) runs.
    fn interrupt_test_irq_handler(&self) -> IsrHandler;

    // ── Basic (polled) mode ──────────────────────────────────

    fn basic_init(&mut self, addr: DeviceAddress) -> Result<(), DriverError>;

    fn basic_read_temperature_array(&mut self) -> Result<Frame, DriverError>;

    /// Thermistor (ambient) temperature.
    fn basic_read_temperature(&mut self) -> Result<f32, DriverError>;

    fn basic_deinit(&mut self) -> Result<(), DriverError>;

    // ── Interrupt mode ───────────────────────────────────────

    /// Program thresholds and enable the chip's INT output. `callback` is
    /// invoked from the ISR entry with each decoded status.
    fn interrupt_init(
        &mut self,
        addr: DeviceAddress,
        params: &InterruptParams,
        callback: StatusCallback,
    ) -> Result<(), DriverError>;

    /// ISR entry servicing the chip in interrupt mode.
    fn interrupt_irq_handler(&self) -> IsrHandler;

    /// Thermistor temperature while in interrupt mode.
    fn interrupt_read_temperature(&mut self) -> Result<f32, DriverError>;

    fn interrupt_deinit(&mut self) -> Result<(), DriverError>;
}

/// Snapshot of the per-pixel interrupt flags (8 status bytes).
///
/// Called from interrupt context: implementations perform one bounded,
/// fixed-size synchronous read and nothing else.
pub trait ThresholdTableSource {
    fn read_threshold_table(&mut self) -> Result<ThresholdTable, DriverError>;
}

// ───────────────────────────────────────────────────────────────
// INT line (GPIO edge interrupt)
// ───────────────────────────────────────────────────────────────

/// Hardware enable/disable of the GPIO edge interrupt feeding the bridge.
pub trait InterruptLine {
    /// Configure the pin and start delivering edges.
    fn enable(&mut self) -> Result<(), LineError>;

    /// Stop delivering edges. Must be safe to call on a line that is
    /// already disabled or only partially enabled.
    fn disable(&mut self) -> Result<(), LineError>;
}
