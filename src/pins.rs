//! GPIO / peripheral pin assignments for the sensor board.
//!
//! Single source of truth: the INT line driver and the `-p` pin report both
//! read from here.

/// One board connection as printed by the pin report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    /// Sensor-side signal name.
    pub signal: &'static str,
    /// MCU GPIO number.
    pub gpio: i32,
}

// ---------------------------------------------------------------------------
// I²C bus (AMG8833 at 0x68 / 0x69)
// ---------------------------------------------------------------------------

pub const I2C_SCL_GPIO: i32 = 15;
pub const I2C_SDA_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Interrupt
// ---------------------------------------------------------------------------

/// AMG8833 INT output: open-drain, active-low, external pull-up.
/// Falling edge = new threshold event.
pub const AMG8833_INT_GPIO: i32 = 16;

/// Connections reported by `amg8833 -p`, in print order.
pub const SENSOR_PINS: [PinAssignment; 3] = [
    PinAssignment { signal: "SCL", gpio: I2C_SCL_GPIO },
    PinAssignment { signal: "SDA", gpio: I2C_SDA_GPIO },
    PinAssignment { signal: "INT", gpio: AMG8833_INT_GPIO },
];
