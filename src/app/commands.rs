//! Inbound commands to the dispatcher.
//!
//! [`parse_args`] turns the shell's token list into one [`OperationMode`].
//! All argument validation happens here, before any hardware is touched.
//!
//! ## Numeric parsing policy
//!
//! `times`, `high`, `low` and `hysteresis` are parsed leniently: leading
//! whitespace is skipped, the longest numeric prefix is used, and input with
//! no numeric prefix reads as zero (`"12abc"` → 12, `"abc"` → 0). A negative
//! iteration count reads as zero. `"0"` and unparsable input are not
//! distinguished. Thresholds accept decimal and exponent forms only:
//! `"inf"`, `"nan"` and hex floats read as zero.

use crate::error::Error;

/// AD_SELECT strapping of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAddress {
    /// AD_SELECT tied to GND (`0`).
    Primary,
    /// AD_SELECT tied to VDD (`1`).
    Secondary,
}

impl DeviceAddress {
    /// 7-bit I²C address.
    pub const fn i2c_address(self) -> u8 {
        match self {
            Self::Primary => 0x68,
            Self::Secondary => 0x69,
        }
    }

    fn parse(token: &str) -> Result<Self, Error> {
        match token {
            "0" => Ok(Self::Primary),
            "1" => Ok(Self::Secondary),
            _ => Err(Error::InvalidParam("address must be 0 or 1")),
        }
    }
}

/// Sensor-side thresholding algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptMode {
    /// Compare each pixel against the absolute thresholds.
    Absolute,
    /// Compare each pixel's frame-to-frame change against the thresholds.
    Differential,
}

impl InterruptMode {
    fn parse(token: &str) -> Result<Self, Error> {
        match token {
            "abs" => Ok(Self::Absolute),
            "diff" => Ok(Self::Differential),
            _ => Err(Error::InvalidParam("mode must be abs or diff")),
        }
    }

    /// Line printed once the mode is accepted.
    pub const fn banner(self) -> &'static str {
        match self {
            Self::Absolute => "amg8833: absolute mode.",
            Self::Differential => "amg8833: difference mode.",
        }
    }
}

/// Threshold configuration for the interrupt modes (degrees Celsius).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterruptParams {
    pub mode: InterruptMode,
    pub high: f32,
    pub low: f32,
    pub hysteresis: f32,
}

/// What one shell invocation asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperationMode {
    Info,
    PinMap,
    Help,
    RegisterTest {
        addr: DeviceAddress,
    },
    ReadTest {
        addr: DeviceAddress,
        times: u32,
    },
    InterruptTest {
        addr: DeviceAddress,
        times: u32,
        params: InterruptParams,
    },
    ContinuousRead {
        addr: DeviceAddress,
        times: u32,
    },
    ContinuousInterruptRead {
        addr: DeviceAddress,
        times: u32,
        params: InterruptParams,
    },
}

/// Map a full token list (`args[0]` is the command name) onto a mode.
///
/// Accepted shapes have 1, 2, 4, 5 or 9 tokens. Anything else, or an
/// unrecognised flag/subcommand/address/mode, is `InvalidParam`.
pub fn parse_args(args: &[&str]) -> Result<OperationMode, Error> {
    match args {
        [_] | [_, "-h"] => Ok(OperationMode::Help),
        [_, "-i"] => Ok(OperationMode::Info),
        [_, "-p"] => Ok(OperationMode::PinMap),
        [_, "-t", "reg", addr] => Ok(OperationMode::RegisterTest {
            addr: DeviceAddress::parse(addr)?,
        }),
        [_, "-t", "read", addr, times] => Ok(OperationMode::ReadTest {
            addr: DeviceAddress::parse(addr)?,
            times: lax_u32(times),
        }),
        [_, "-c", "read", addr, times] => Ok(OperationMode::ContinuousRead {
            addr: DeviceAddress::parse(addr)?,
            times: lax_u32(times),
        }),
        [_, "-t", "int", addr, times, mode, high, low, hysteresis] => {
            let addr = DeviceAddress::parse(addr)?;
            Ok(OperationMode::InterruptTest {
                addr,
                times: lax_u32(times),
                params: interrupt_params(mode, high, low, hysteresis)?,
            })
        }
        [_, "-c", "int", addr, times, mode, high, low, hysteresis] => {
            let addr = DeviceAddress::parse(addr)?;
            Ok(OperationMode::ContinuousInterruptRead {
                addr,
                times: lax_u32(times),
                params: interrupt_params(mode, high, low, hysteresis)?,
            })
        }
        _ => Err(Error::InvalidParam("unrecognised arguments")),
    }
}

fn interrupt_params(
    mode: &str,
    high: &str,
    low: &str,
    hysteresis: &str,
) -> Result<InterruptParams, Error> {
    Ok(InterruptParams {
        mode: InterruptMode::parse(mode)?,
        high: lax_f32(high),
        low: lax_f32(low),
        hysteresis: lax_f32(hysteresis),
    })
}

// ── Lenient numeric parsing ───────────────────────────────────

/// Integer prefix of `s`; zero when there is none or when it is negative.
/// Saturates at `u32::MAX`.
pub fn lax_u32(s: &str) -> u32 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        });

    if negative { 0 } else { value }
}

/// Floating-point prefix of `s` (`[+-]digits[.digits][e[+-]digits]`); zero
/// when there is none.
pub fn lax_f32(s: &str) -> f32 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_digits = count_digits(&bytes[end..]);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = count_digits(&bytes[end + 1..]);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(&bytes[exp_end.min(bytes.len())..]);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    s[..end].parse().unwrap_or(0.0)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
