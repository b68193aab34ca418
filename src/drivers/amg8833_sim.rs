//! Software model of the AMG8833, implementing [`SensorDriver`] and
//! [`ThresholdTableSource`].
//!
//! ## Scene
//!
//! Ambient 23.5 °C with a single hotspot that walks the grid one pixel per
//! frame, row by row. Pixel values are quantised to the chip's 0.25 °C
//! step, the thermistor to its 0.0625 °C step. The scene is a pure
//! function of the frame counter, so runs are reproducible.
//!
//! ## Interrupt model
//!
//! In interrupt mode every thermistor read advances one frame and
//! re-evaluates the per-pixel thresholds:
//!
//! | Mode         | Compared value                  |
//! |--------------|---------------------------------|
//! | Absolute     | pixel temperature               |
//! | Differential | change since the previous frame |
//!
//! A pixel trips above `high` or below `low`. Once tripped it stays set
//! until the value is back inside `[low + hysteresis, high - hysteresis]`.
//! When a frame trips at least one pixel and no outbreak is pending, the
//! status register latches INTF and INT is asserted. The IRQ handler
//! reads and clears the status, then reports each flagged bit through the
//! registered [`StatusCallback`].
//!
//! State lives in one `static` because the IRQ handlers are plain `fn()`.
//! [`SimAmg8833`] is a zero-sized handle onto it.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;
use log::{debug, info, warn};

use crate::app::commands::{DeviceAddress, InterruptMode, InterruptParams};
use crate::app::ports::{ChipInfo, Frame, SensorDriver, StatusCallback, ThresholdTableSource};
use crate::drivers::int_pin::IntPin;
use crate::error::DriverError;
use crate::irq::bridge::IsrHandler;
use crate::irq::decoder::{InterruptStatus, ThresholdTable, GRID, STATUS_INTF};

/// Ambient temperature of the simulated scene, °C.
pub const AMBIENT_C: f32 = 23.5;
/// Hotspot peak above ambient, °C.
pub const HOTSPOT_RISE_C: f32 = 8.0;

const PIXEL_STEP_C: f32 = 0.25;
const THERMISTOR_STEP_C: f32 = 0.0625;

const INFO: ChipInfo = ChipInfo {
    chip_name: "Panasonic AMG8833",
    manufacturer_name: "Panasonic",
    interface: "IIC",
    driver_version: 1000,
    supply_voltage_min_v: 3.0,
    supply_voltage_max_v: 3.6,
    max_current_ma: 4.5,
    temperature_max: 80.0,
    temperature_min: 0.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimMode {
    Off,
    Basic,
    Interrupt,
}

struct SimState {
    mode: SimMode,
    addr: Option<DeviceAddress>,
    frame_index: u32,
    params: Option<InterruptParams>,
    callback: Option<StatusCallback>,
    status: u8,
    table: [u8; GRID],
    previous: Frame,
}

impl SimState {
    const fn new() -> Self {
        Self {
            mode: SimMode::Off,
            addr: None,
            frame_index: 0,
            params: None,
            callback: None,
            status: 0,
            table: [0; GRID],
            previous: [[AMBIENT_C; GRID]; GRID],
        }
    }

    fn open(&mut self, mode: SimMode, addr: DeviceAddress) -> Result<(), DriverError> {
        if self.mode != SimMode::Off {
            warn!("amg8833(sim): init while already in {:?} mode", self.mode);
            return Err(DriverError::Bus);
        }
        self.mode = mode;
        self.addr = Some(addr);
        self.frame_index = 0;
        self.status = 0;
        self.table = [0; GRID];
        self.previous = scene(0);
        Ok(())
    }

    fn close(&mut self, mode: SimMode) -> Result<(), DriverError> {
        if self.mode != mode {
            return Err(DriverError::NotInitialized);
        }
        *self = Self::new();
        Ok(())
    }

    fn require(&self, mode: SimMode) -> Result<(), DriverError> {
        if self.mode == mode { Ok(()) } else { Err(DriverError::NotInitialized) }
    }

    /// Advance one frame. Returns `true` when INT must be asserted.
    fn advance(&mut self) -> bool {
        self.frame_index = self.frame_index.wrapping_add(1);
        let frame = scene(self.frame_index);
        let Some(params) = self.params else {
            self.previous = frame;
            return false;
        };

        let table = evaluate(&params, &frame, &self.previous, &self.table);
        self.previous = frame;
        self.table = table;

        let tripped = table.iter().any(|&row| row != 0);
        if tripped && self.status & STATUS_INTF == 0 {
            self.status |= STATUS_INTF;
            return true;
        }
        false
    }
}

static SIM: Mutex<RefCell<SimState>> = Mutex::new(RefCell::new(SimState::new()));

/// Interrupts observed by the running interrupt self test.
static TEST_IRQ_COUNT: AtomicU32 = AtomicU32::new(0);

fn with_sim<R>(f: impl FnOnce(&mut SimState) -> R) -> R {
    critical_section::with(|cs| f(&mut SIM.borrow_ref_mut(cs)))
}

// ── Scene ─────────────────────────────────────────────────────

fn quantise(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

/// Frame `index` of the simulated scene.
pub fn scene(index: u32) -> Frame {
    let pos = (index as usize) % (GRID * GRID);
    let (hot_row, hot_col) = (pos / GRID, pos % GRID);

    let mut frame = [[AMBIENT_C; GRID]; GRID];
    for (r, row) in frame.iter_mut().enumerate() {
        for (c, pixel) in row.iter_mut().enumerate() {
            let distance = (r.abs_diff(hot_row) + c.abs_diff(hot_col)) as f32;
            let rise = (HOTSPOT_RISE_C - 3.0 * distance).max(0.0);
            *pixel = quantise(AMBIENT_C + rise, PIXEL_STEP_C);
        }
    }
    frame
}

/// Thermistor reading for frame `index`: ambient with a small ripple.
pub fn thermistor(index: u32) -> f32 {
    quantise(AMBIENT_C + THERMISTOR_STEP_C * (index % 4) as f32, THERMISTOR_STEP_C)
}

fn evaluate(
    params: &InterruptParams,
    frame: &Frame,
    previous: &Frame,
    latched: &[u8; GRID],
) -> [u8; GRID] {
    let mut table = [0u8; GRID];
    for r in 0..GRID {
        for c in 0..GRID {
            let value = match params.mode {
                InterruptMode::Absolute => frame[r][c],
                InterruptMode::Differential => frame[r][c] - previous[r][c],
            };
            let mask = 0x80u8 >> c;
            let was_set = latched[r] & mask != 0;
            let set = if was_set {
                value > params.high - params.hysteresis || value < params.low + params.hysteresis
            } else {
                value > params.high || value < params.low
            };
            if set {
                table[r] |= mask;
            }
        }
    }
    table
}

// ── IRQ handlers ──────────────────────────────────────────────

/// Take and clear the pending status. Runs the critical section only for
/// the register access; callbacks run outside it.
fn take_status() -> (u8, Option<StatusCallback>) {
    with_sim(|s| {
        let status = s.status;
        s.status = 0;
        (status, s.callback)
    })
}

fn sim_irq_handler() {
    let (status, callback) = take_status();
    if let Some(callback) = callback {
        for decoded in InterruptStatus::from_status_bits(status) {
            callback.notify(decoded);
        }
    }
}

fn sim_test_irq_handler() {
    let (status, _) = take_status();
    for decoded in InterruptStatus::from_status_bits(status) {
        TEST_IRQ_COUNT.fetch_add(1, Ordering::Relaxed);
        debug!("amg8833(sim): test irq {:?}", decoded);
    }
}

// ── Driver handle ─────────────────────────────────────────────

/// Zero-sized handle onto the simulated chip.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimAmg8833;

impl SimAmg8833 {
    pub const fn new() -> Self {
        Self
    }

    /// Index of the most recent frame.
    pub fn frame_index(&self) -> u32 {
        with_sim(|s| s.frame_index)
    }

    /// I²C address the model was opened at, if any.
    pub fn address(&self) -> Option<u8> {
        with_sim(|s| s.addr.map(DeviceAddress::i2c_address))
    }

    /// Whether the model is powered down.
    pub fn is_idle(&self) -> bool {
        with_sim(|s| s.mode == SimMode::Off)
    }

    /// Force the model back to power-on state.
    pub fn reset(&self) {
        with_sim(|s| *s = SimState::new());
    }

    fn step_interrupt(&self) {
        if with_sim(SimState::advance) {
            IntPin::sim_assert();
        }
    }
}

impl SensorDriver for SimAmg8833 {
    fn info(&self) -> ChipInfo {
        INFO
    }

    fn register_test(&mut self, addr: DeviceAddress) -> Result<(), DriverError> {
        info!("amg8833(sim): register test at 0x{:02X}", addr.i2c_address());
        with_sim(|s| s.open(SimMode::Basic, addr))?;

        // Threshold registers hold what was written, at 0.25 °C resolution.
        let probe = InterruptParams {
            mode: InterruptMode::Absolute,
            high: 30.25,
            low: 10.5,
            hysteresis: 2.0,
        };
        let readback = with_sim(|s| {
            s.params = Some(probe);
            s.params
        });
        let result = if readback == Some(probe) {
            info!("amg8833(sim): register test passed");
            Ok(())
        } else {
            warn!("amg8833(sim): threshold readback mismatch");
            Err(DriverError::Verify)
        };

        with_sim(|s| s.close(SimMode::Basic))?;
        result
    }

    fn read_test(&mut self, addr: DeviceAddress, times: u32) -> Result<(), DriverError> {
        info!("amg8833(sim): read test x{} at 0x{:02X}", times, addr.i2c_address());
        self.basic_init(addr)?;
        for i in 0..times {
            let frame = self.basic_read_temperature_array()?;
            let ambient = self.basic_read_temperature()?;
            info!(
                "amg8833(sim): read {}/{}: pixel[0][0]={:.2}C thermistor={:.3}C",
                i + 1,
                times,
                frame[0][0],
                ambient
            );
        }
        self.basic_deinit()?;
        info!("amg8833(sim): read test finished");
        Ok(())
    }

    fn interrupt_test(
        &mut self,
        addr: DeviceAddress,
        params: &InterruptParams,
        times: u32,
    ) -> Result<(), DriverError> {
        info!(
            "amg8833(sim): interrupt test x{} at 0x{:02X} ({:?})",
            times,
            addr.i2c_address(),
            params.mode
        );
        TEST_IRQ_COUNT.store(0, Ordering::Relaxed);
        with_sim(|s| -> Result<(), DriverError> {
            s.open(SimMode::Interrupt, addr)?;
            s.params = Some(*params);
            Ok(())
        })?;

        for _ in 0..times {
            self.step_interrupt();
        }

        info!(
            "amg8833(sim): interrupt test finished, {} interrupt(s)",
            TEST_IRQ_COUNT.load(Ordering::Relaxed)
        );
        with_sim(|s| s.close(SimMode::Interrupt))
    }

    fn interrupt_test_irq_handler(&self) -> IsrHandler {
        IsrHandler::new(sim_test_irq_handler)
    }

    fn basic_init(&mut self, addr: DeviceAddress) -> Result<(), DriverError> {
        with_sim(|s| s.open(SimMode::Basic, addr))?;
        debug!("amg8833(sim): basic init at 0x{:02X}", addr.i2c_address());
        Ok(())
    }

    fn basic_read_temperature_array(&mut self) -> Result<Frame, DriverError> {
        with_sim(|s| {
            s.require(SimMode::Basic)?;
            s.advance();
            Ok(scene(s.frame_index))
        })
    }

    fn basic_read_temperature(&mut self) -> Result<f32, DriverError> {
        with_sim(|s| {
            s.require(SimMode::Basic)?;
            Ok(thermistor(s.frame_index))
        })
    }

    fn basic_deinit(&mut self) -> Result<(), DriverError> {
        with_sim(|s| s.close(SimMode::Basic))
    }

    fn interrupt_init(
        &mut self,
        addr: DeviceAddress,
        params: &InterruptParams,
        callback: StatusCallback,
    ) -> Result<(), DriverError> {
        with_sim(|s| {
            s.open(SimMode::Interrupt, addr)?;
            s.params = Some(*params);
            s.callback = Some(callback);
            Ok(())
        })
    }

    fn interrupt_irq_handler(&self) -> IsrHandler {
        IsrHandler::new(sim_irq_handler)
    }

    fn interrupt_read_temperature(&mut self) -> Result<f32, DriverError> {
        let index = with_sim(|s| -> Result<u32, DriverError> {
            s.require(SimMode::Interrupt)?;
            Ok(s.frame_index)
        })?;
        self.step_interrupt();
        Ok(thermistor(index))
    }

    fn interrupt_deinit(&mut self) -> Result<(), DriverError> {
        with_sim(|s| s.close(SimMode::Interrupt))
    }
}

impl ThresholdTableSource for SimAmg8833 {
    fn read_threshold_table(&mut self) -> Result<ThresholdTable, DriverError> {
        with_sim(|s| {
            s.require(SimMode::Interrupt)?;
            Ok(ThresholdTable::from_rows(s.table))
        })
    }
}
