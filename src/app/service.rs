//! Command dispatcher: the `amg8833` shell command.
//!
//! [`Amg8833Command`] owns the driver capability, the interrupt bridge and
//! the delay source, and runs one invocation through a fixed sequence:
//!
//! ```text
//!  Idle ──parse──▶ Validated ──init/arm──▶ Active ──▶ Teardown ──▶ Done
//!    │                 │                     │
//!    └─ InvalidParam ──┴── init failed ──────┴─ (teardown always runs)
//! ```
//!
//! Validation errors return before any hardware call. Once a mode has
//! brought the device up, teardown (driver deinit, bridge disarm) runs on
//! every exit path and its own failures are only logged.

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::app::commands::{parse_args, DeviceAddress, InterruptParams, OperationMode};
use crate::app::ports::{Frame, InterruptLine, SensorDriver, StatusCallback};
use crate::config::ShellConfig;
use crate::error::{Error, Result};
use crate::irq::bridge::InterruptBridge;
use crate::pins;
use crate::shell::{ShellCommand, ShellStatus};

/// Name the command is registered under.
pub const COMMAND_NAME: &str = "amg8833";

const HELP: &str = "\
amg8833 -i
\tshow amg8833 chip and driver information.
amg8833 -h
\tshow amg8833 help.
amg8833 -p
\tshow amg8833 pin connections of the current board.
amg8833 -t reg (0 | 1)
\trun amg8833 register test.
amg8833 -t read (0 | 1) <times>
\trun amg8833 read test.times means test times.
amg8833 -t int (0 | 1) <times> <mode> <high> <low> <hysteresis>
\trun amg8833 interrupt test.times means test times.mode is the interrupt mode and it can be \"abs\" and \"diff\".\
high is the interrupt high level.low is the interrupt low level.hysteresis is the hysteresis level.
amg8833 -c read (0 | 1) <times>
\trun amg8833 read function.times means test times.
amg8833 -c int (0 | 1) <times> <mode> <high> <low> <hysteresis>
\trun amg8833 interrupt function.times means test times.mode is the interrupt mode and it can be \"abs\" and \"diff\".\
high is the interrupt high level.low is the interrupt low level.hysteresis is the hysteresis level.
";

/// Where the current (or last) invocation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validated,
    Active,
    Teardown,
    Done,
}

/// The `amg8833` command.
pub struct Amg8833Command<D, L, T>
where
    L: InterruptLine,
{
    driver: D,
    bridge: InterruptBridge<L>,
    delay: T,
    config: ShellConfig,
    /// Handed to the driver in continuous interrupt mode.
    on_status: StatusCallback,
    phase: Phase,
}

impl<D, L, T> Amg8833Command<D, L, T>
where
    D: SensorDriver,
    L: InterruptLine,
    T: DelayNs,
{
    pub fn new(
        driver: D,
        bridge: InterruptBridge<L>,
        delay: T,
        config: ShellConfig,
        on_status: StatusCallback,
    ) -> Self {
        Self {
            driver,
            bridge,
            delay,
            config,
            on_status,
            phase: Phase::Idle,
        }
    }

    /// Run one invocation. `args[0]` is the command name.
    pub fn execute(&mut self, args: &[&str], out: &mut dyn Write) -> ShellStatus {
        self.phase = Phase::Idle;

        let mode = match parse_args(args) {
            Ok(mode) => mode,
            Err(e) => {
                debug!("amg8833: rejected {:?}: {}", args, e);
                self.enter(Phase::Done);
                return e.status();
            }
        };
        self.enter(Phase::Validated);

        let result = self.dispatch(mode, out);
        self.enter(Phase::Done);

        match result {
            Ok(()) => ShellStatus::Success,
            Err(e) => {
                warn!("amg8833: {:?} failed: {}", mode, e);
                e.status()
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn bridge(&self) -> &InterruptBridge<L> {
        &self.bridge
    }

    pub fn delay(&self) -> &T {
        &self.delay
    }

    // ── Dispatch ──────────────────────────────────────────────

    fn dispatch(&mut self, mode: OperationMode, out: &mut dyn Write) -> Result<()> {
        match mode {
            OperationMode::Info => self.print_info(out),
            OperationMode::PinMap => print_pin_map(out),
            OperationMode::Help => out.write_str(HELP).map_err(Error::from),
            OperationMode::RegisterTest { addr } => self
                .driver
                .register_test(addr)
                .map_err(Error::TestFailed),
            OperationMode::ReadTest { addr, times } => self.run_read_test(addr, times),
            OperationMode::InterruptTest { addr, times, params } => {
                self.run_interrupt_test(addr, times, &params, out)
            }
            OperationMode::ContinuousRead { addr, times } => {
                self.run_continuous_read(addr, times, out)
            }
            OperationMode::ContinuousInterruptRead { addr, times, params } => {
                self.run_continuous_interrupt_read(addr, times, &params, out)
            }
        }
    }

    fn print_info(&self, out: &mut dyn Write) -> Result<()> {
        let info = self.driver.info();
        writeln!(out, "amg8833: chip is {}.", info.chip_name)?;
        writeln!(out, "amg8833: manufacturer is {}.", info.manufacturer_name)?;
        writeln!(out, "amg8833: interface is {}.", info.interface)?;
        writeln!(
            out,
            "amg8833: driver version is {}.{}.",
            info.driver_version / 1000,
            (info.driver_version % 1000) / 100
        )?;
        writeln!(out, "amg8833: min supply voltage is {:.1}V.", info.supply_voltage_min_v)?;
        writeln!(out, "amg8833: max supply voltage is {:.1}V.", info.supply_voltage_max_v)?;
        writeln!(out, "amg8833: max current is {:.2}mA.", info.max_current_ma)?;
        writeln!(out, "amg8833: max temperature is {:.1}C.", info.temperature_max)?;
        writeln!(out, "amg8833: min temperature is {:.1}C.", info.temperature_min)?;
        Ok(())
    }

    // ── Self tests ────────────────────────────────────────────

    fn run_read_test(&mut self, addr: DeviceAddress, times: u32) -> Result<()> {
        self.enter(Phase::Active);
        let result = self.driver.read_test(addr, times).map_err(Error::TestFailed);
        self.enter(Phase::Teardown);
        result
    }

    fn run_interrupt_test(
        &mut self,
        addr: DeviceAddress,
        times: u32,
        params: &InterruptParams,
        out: &mut dyn Write,
    ) -> Result<()> {
        writeln!(out, "{}", params.mode.banner())?;

        self.bridge.arm(self.driver.interrupt_test_irq_handler())?;
        self.enter(Phase::Active);

        let result = self
            .driver
            .interrupt_test(addr, params, times)
            .map_err(Error::TestFailed);

        self.enter(Phase::Teardown);
        self.bridge.disarm();
        result
    }

    // ── Continuous polled read ────────────────────────────────

    fn run_continuous_read(
        &mut self,
        addr: DeviceAddress,
        times: u32,
        out: &mut dyn Write,
    ) -> Result<()> {
        self.driver.basic_init(addr).map_err(Error::DeviceInit)?;
        self.enter(Phase::Active);
        info!("amg8833: continuous read x{} at 0x{:02X}", times, addr.i2c_address());

        let result = self.continuous_read_loop(times, out);

        self.enter(Phase::Teardown);
        if let Err(e) = self.driver.basic_deinit() {
            warn!("amg8833: basic deinit failed: {}", e);
        }
        result
    }

    fn continuous_read_loop(&mut self, times: u32, out: &mut dyn Write) -> Result<()> {
        self.delay.delay_ms(self.config.settle_delay_ms);

        for _ in 0..times {
            let frame = match self.driver.basic_read_temperature_array() {
                Ok(frame) => frame,
                Err(e) => {
                    writeln!(out, "amg8833: read temperature array failed.")?;
                    return Err(Error::DeviceRead(e));
                }
            };
            write_frame(out, &frame)?;

            let temperature = match self.driver.basic_read_temperature() {
                Ok(t) => t,
                Err(e) => {
                    writeln!(out, "amg8833: read temperature failed.")?;
                    return Err(Error::DeviceRead(e));
                }
            };
            writeln!(out, "amg8833: temperature is {:.3}C.", temperature)?;

            self.delay.delay_ms(self.config.report_interval_ms);
        }
        Ok(())
    }

    // ── Continuous interrupt-driven read ──────────────────────

    fn run_continuous_interrupt_read(
        &mut self,
        addr: DeviceAddress,
        times: u32,
        params: &InterruptParams,
        out: &mut dyn Write,
    ) -> Result<()> {
        writeln!(out, "{}", params.mode.banner())?;

        // Armed before the chip can assert INT.
        self.bridge.arm(self.driver.interrupt_irq_handler())?;
        if let Err(e) = self.driver.interrupt_init(addr, params, self.on_status) {
            self.bridge.disarm();
            return Err(Error::DeviceInit(e));
        }
        self.enter(Phase::Active);
        info!(
            "amg8833: interrupt read x{} at 0x{:02X} ({:?}, high={}, low={}, hyst={})",
            times,
            addr.i2c_address(),
            params.mode,
            params.high,
            params.low,
            params.hysteresis
        );

        let result = self.interrupt_read_loop(times, out);

        self.enter(Phase::Teardown);
        if let Err(e) = self.driver.interrupt_deinit() {
            warn!("amg8833: interrupt deinit failed: {}", e);
        }
        self.bridge.disarm();
        result
    }

    fn interrupt_read_loop(&mut self, times: u32, out: &mut dyn Write) -> Result<()> {
        self.delay.delay_ms(self.config.settle_delay_ms);

        for _ in 0..times {
            match self.driver.interrupt_read_temperature() {
                Ok(t) => writeln!(out, "amg8833: temperature is {:.3}C.", t)?,
                Err(e) => {
                    writeln!(out, "amg8833: read temperature failed.")?;
                    return Err(Error::DeviceRead(e));
                }
            }
            self.delay.delay_ms(self.config.report_interval_ms);
        }
        Ok(())
    }

    fn enter(&mut self, next: Phase) {
        debug!("amg8833: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

impl<D, L, T> ShellCommand for Amg8833Command<D, L, T>
where
    D: SensorDriver,
    L: InterruptLine,
    T: DelayNs,
{
    fn name(&self) -> &'static str {
        COMMAND_NAME
    }

    fn run(&mut self, args: &[&str], out: &mut dyn Write) -> ShellStatus {
        self.execute(args, out)
    }
}

fn print_pin_map(out: &mut dyn Write) -> Result<()> {
    for pin in &pins::SENSOR_PINS {
        writeln!(out, "amg8833: {} connected to GPIO{}.", pin.signal, pin.gpio)?;
    }
    Ok(())
}

/// 8 lines of 8 cells, two decimals, two spaces between cells.
fn write_frame(out: &mut dyn Write, frame: &Frame) -> Result<()> {
    for row in frame {
        for (col, value) in row.iter().enumerate() {
            if col > 0 {
                out.write_str("  ")?;
            }
            write!(out, "{:.2}", value)?;
        }
        out.write_char('\n')?;
    }
    Ok(())
}
