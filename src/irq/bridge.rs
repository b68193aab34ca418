//! Interrupt bridge: hands a GPIO edge from interrupt context to the one
//! currently armed handler.
//!
//! ```text
//!  INT pin edge ──▶ ISR ──▶ InterruptSlot::on_edge() ──▶ armed IsrHandler
//!                              ▲
//!  foreground ── InterruptBridge::arm / disarm (sole writers of the slot)
//! ```
//!
//! ## Lifecycle
//!
//! - `arm`: store the handler, then enable the line. If enabling fails the
//!   slot is emptied again and the line gets a best-effort disable, so the
//!   caller never proceeds with a half-armed bridge.
//! - `disarm`: disable the line first, then clear the slot. A late edge
//!   can therefore only ever see a valid handler or an empty slot.
//!   Idempotent.
//! - `on_edge`: called from the ISR. Empty slot → edge dropped. An edge
//!   that arrives while the previous handler is still running is dropped
//!   and counted as lost; there is no queueing.
//!
//! The slot is the only state shared between the two contexts. It lives in
//! a `static` (ISRs cannot capture), but only the [`InterruptBridge`] that
//! claimed it can write to it.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use log::{debug, warn};

use crate::app::ports::InterruptLine;
use crate::error::LineError;

/// Slot behind the sensor's INT pin. The platform ISR calls
/// `INT_SLOT.on_edge()`.
pub static INT_SLOT: InterruptSlot = InterruptSlot::new();

/// A handler that is allowed to run in interrupt context.
///
/// Wraps a plain `fn()`: no captured environment, so no foreground state
/// can leak into the ISR. The function itself must be short, must not block,
/// and must not allocate.
#[derive(Debug, Clone, Copy)]
pub struct IsrHandler(fn());

impl IsrHandler {
    pub const fn new(f: fn()) -> Self {
        Self(f)
    }

    #[inline]
    fn invoke(self) {
        (self.0)();
    }
}

/// Process-wide storage for the armed handler.
pub struct InterruptSlot {
    handler: Mutex<Cell<Option<IsrHandler>>>,
    claimed: AtomicBool,
    in_handler: AtomicBool,
    delivered: AtomicU32,
    lost: AtomicU32,
}

impl InterruptSlot {
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(Cell::new(None)),
            claimed: AtomicBool::new(false),
            in_handler: AtomicBool::new(false),
            delivered: AtomicU32::new(0),
            lost: AtomicU32::new(0),
        }
    }

    /// Entry point for the edge-detection layer. Safe to call at any time,
    /// including after disarm.
    pub fn on_edge(&self) {
        let Some(handler) = critical_section::with(|cs| self.handler.borrow(cs).get()) else {
            return;
        };

        if self.in_handler.swap(true, Ordering::Acquire) {
            self.lost.fetch_add(1, Ordering::Relaxed);
            return;
        }
        handler.invoke();
        self.delivered.fetch_add(1, Ordering::Relaxed);
        self.in_handler.store(false, Ordering::Release);
    }

    /// Whether a handler is currently installed.
    pub fn is_armed(&self) -> bool {
        critical_section::with(|cs| self.handler.borrow(cs).get().is_some())
    }

    /// Edges that reached a handler.
    pub fn delivered_edges(&self) -> u32 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Edges dropped because a handler was still running.
    pub fn lost_edges(&self) -> u32 {
        self.lost.load(Ordering::Relaxed)
    }

    fn install(&self, handler: IsrHandler) {
        critical_section::with(|cs| self.handler.borrow(cs).set(Some(handler)));
    }

    fn clear(&self) {
        critical_section::with(|cs| self.handler.borrow(cs).set(None));
    }
}

impl Default for InterruptSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive owner of one [`InterruptSlot`] and the line that feeds it.
pub struct InterruptBridge<L: InterruptLine> {
    slot: &'static InterruptSlot,
    line: L,
    armed: bool,
}

impl<L: InterruptLine> InterruptBridge<L> {
    /// Claim `slot`. Returns `None` if another bridge already owns it.
    pub fn new(slot: &'static InterruptSlot, line: L) -> Option<Self> {
        if slot.claimed.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(Self {
            slot,
            line,
            armed: false,
        })
    }

    /// Install `handler` and enable the line.
    ///
    /// Re-arming an armed bridge replaces the handler; the line stays enabled.
    pub fn arm(&mut self, handler: IsrHandler) -> Result<(), LineError> {
        self.slot.install(handler);
        if self.armed {
            debug!("irq: handler replaced");
            return Ok(());
        }

        match self.line.enable() {
            Ok(()) => {
                self.armed = true;
                debug!("irq: armed");
                Ok(())
            }
            Err(e) => {
                self.slot.clear();
                if let Err(rollback) = self.line.disable() {
                    debug!("irq: rollback disable failed: {}", rollback);
                }
                warn!("irq: arm failed, slot rolled back: {}", e);
                Err(e)
            }
        }
    }

    /// Disable the line, then clear the slot. No-op when not armed.
    /// Line errors are logged, never returned.
    pub fn disarm(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.line.disable() {
            warn!("irq: disable failed during disarm: {}", e);
        }
        self.slot.clear();
        self.armed = false;
        debug!(
            "irq: disarmed (delivered={}, lost={})",
            self.slot.delivered_edges(),
            self.slot.lost_edges()
        );
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn slot(&self) -> &'static InterruptSlot {
        self.slot
    }

    pub fn line(&self) -> &L {
        &self.line
    }
}

impl<L: InterruptLine> Drop for InterruptBridge<L> {
    fn drop(&mut self) {
        self.disarm();
        self.slot.claimed.store(false, Ordering::Release);
    }
}
