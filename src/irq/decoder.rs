//! Interrupt event decoder.
//!
//! Turns the status the driver reports for an INT assertion into the
//! user-visible report. For a threshold outbreak this reads the 8-byte
//! pixel flag table and prints it as an 8×8 grid of `1`/`0`.
//!
//! Bit mapping (fixed): byte `r` is grid row `r`; bit 7 is column 0 and
//! bit 0 is column 7. `0b1010_0000` prints as `1 0 1 0 0 0 0 0`.
//!
//! Everything here runs in interrupt context: no allocation, one bounded
//! table read, output through a caller-supplied `fmt::Write`.

use core::fmt::{self, Write};

use crate::app::ports::ThresholdTableSource;

/// Status register bit: thermistor output overflow.
pub const STATUS_OVF_THS: u8 = 1 << 3;
/// Status register bit: pixel temperature output overflow.
pub const STATUS_OVF_IRS: u8 = 1 << 2;
/// Status register bit: interrupt outbreak.
pub const STATUS_INTF: u8 = 1 << 1;

/// Grid dimension.
pub const GRID: usize = 8;

/// Characters in one formatted row: 8 digits, 7 separators.
pub const ROW_TEXT_LEN: usize = 2 * GRID - 1;

/// Why the INT line fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptStatus {
    ThermistorOverflow,
    TemperatureOverflow,
    ThresholdOutbreak,
    Unknown,
}

impl InterruptStatus {
    /// Classify a single status-register bit.
    pub const fn from_status_bit(bit: u8) -> Self {
        match bit {
            STATUS_OVF_THS => Self::ThermistorOverflow,
            STATUS_OVF_IRS => Self::TemperatureOverflow,
            STATUS_INTF => Self::ThresholdOutbreak,
            _ => Self::Unknown,
        }
    }

    /// Every status flagged in a raw status register value, highest bit first.
    pub fn from_status_bits(bits: u8) -> impl Iterator<Item = Self> {
        (0..8u8)
            .rev()
            .map(|n| 1u8 << n)
            .filter(move |mask| bits & mask != 0)
            .map(Self::from_status_bit)
    }
}

/// Per-pixel threshold flags, one byte per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ThresholdTable([u8; GRID]);

impl ThresholdTable {
    pub const fn from_rows(rows: [u8; GRID]) -> Self {
        Self(rows)
    }

    pub const fn rows(&self) -> [u8; GRID] {
        self.0
    }
}

impl fmt::Display for ThresholdTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &row in &self.0 {
            f.write_str(&format_row(row))?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// One row, MSB first, cells separated by a single space.
pub fn format_row(byte: u8) -> heapless::String<ROW_TEXT_LEN> {
    let mut s = heapless::String::new();
    for col in 0..GRID {
        let set = (byte >> (7 - col)) & 0x01 != 0;
        // Capacity is exact, pushes cannot fail.
        if col > 0 {
            let _ = s.push(' ');
        }
        let _ = s.push(if set { '1' } else { '0' });
    }
    s
}

/// Produce the report for one decoded status.
///
/// A failed table read prints a diagnostic and stops; a partial table is
/// never shown.
pub fn report_status<S, W>(status: InterruptStatus, source: &mut S, out: &mut W) -> fmt::Result
where
    S: ThresholdTableSource + ?Sized,
    W: Write + ?Sized,
{
    match status {
        InterruptStatus::ThermistorOverflow => {
            out.write_str("amg8833: irq thermistor temperature output overflow.\n")
        }
        InterruptStatus::TemperatureOverflow => {
            out.write_str("amg8833: irq temperature output overflow.\n")
        }
        InterruptStatus::ThresholdOutbreak => {
            out.write_str("amg8833: irq interrupt outbreak.\n")?;
            match source.read_threshold_table() {
                Ok(table) => write!(out, "{}", table),
                Err(_) => out.write_str("amg8833: get table failed.\n"),
            }
        }
        InterruptStatus::Unknown => out.write_str("amg8833: unknown code.\n"),
    }
}
