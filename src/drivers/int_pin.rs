//! AMG8833 INT pin as an [`InterruptLine`].
//!
//! The chip drives INT low while an interrupt is pending, so the pin is an
//! input with pull-up that fires on the falling edge. The raw GPIO ISR does
//! one thing: forward the edge to [`INT_SLOT`].
//!
//! [`IntPin::sim_assert`] injects a software edge for the simulated chip.
//! It is forwarded only while the line is enabled, on either target.

use core::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

use crate::app::ports::InterruptLine;
use crate::error::LineError;
use crate::irq::bridge::INT_SLOT;
use crate::pins;

static LINE_ENABLED: AtomicBool = AtomicBool::new(false);

/// The sensor's INT input.
pub struct IntPin {
    gpio: i32,
    #[cfg(target_os = "espidf")]
    handler_added: bool,
}

impl IntPin {
    pub fn new() -> Self {
        Self {
            gpio: pins::AMG8833_INT_GPIO,
            #[cfg(target_os = "espidf")]
            handler_added: false,
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }
}

impl Default for IntPin {
    fn default() -> Self {
        Self::new()
    }
}

// ── ESP-IDF ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn int_gpio_isr(_arg: *mut core::ffi::c_void) {
    INT_SLOT.on_edge();
}

#[cfg(target_os = "espidf")]
impl InterruptLine for IntPin {
    fn enable(&mut self) -> Result<(), LineError> {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << self.gpio,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
        };
        // SAFETY: plain register configuration of a pin owned by this line.
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK {
            return Err(LineError::EnableFailed(ret));
        }

        // SAFETY: ESP_ERR_INVALID_STATE means the service is already
        // installed, which is fine. The registered ISR only touches INT_SLOT.
        unsafe {
            let ret = gpio_install_isr_service(0);
            if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
                return Err(LineError::IsrInstallFailed(ret));
            }

            if !self.handler_added {
                let ret =
                    gpio_isr_handler_add(self.gpio, Some(int_gpio_isr), core::ptr::null_mut());
                if ret != ESP_OK {
                    return Err(LineError::IsrInstallFailed(ret));
                }
                self.handler_added = true;
            }

            let ret = gpio_intr_enable(self.gpio);
            if ret != ESP_OK {
                return Err(LineError::EnableFailed(ret));
            }
        }
        LINE_ENABLED.store(true, Ordering::Release);
        info!("int_pin: GPIO{} falling-edge interrupt enabled", self.gpio);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), LineError> {
        LINE_ENABLED.store(false, Ordering::Release);
        // SAFETY: disabling an interrupt source and removing its handler is
        // valid in any state; removal of an absent handler is skipped.
        unsafe {
            let ret = gpio_intr_disable(self.gpio);
            if ret != ESP_OK {
                return Err(LineError::DisableFailed(ret));
            }
            if self.handler_added {
                let ret = gpio_isr_handler_remove(self.gpio);
                if ret != ESP_OK {
                    return Err(LineError::DisableFailed(ret));
                }
                self.handler_added = false;
            }
        }
        info!("int_pin: GPIO{} interrupt disabled", self.gpio);
        Ok(())
    }
}

// ── Software edge ─────────────────────────────────────────────

impl IntPin {
    /// Software falling edge on INT. Dropped while the line is disabled.
    pub fn sim_assert() {
        if LINE_ENABLED.load(Ordering::Acquire) {
            INT_SLOT.on_edge();
        }
    }

    pub fn sim_enabled() -> bool {
        LINE_ENABLED.load(Ordering::Acquire)
    }
}

// ── Host ──────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl InterruptLine for IntPin {
    fn enable(&mut self) -> Result<(), LineError> {
        LINE_ENABLED.store(true, Ordering::Release);
        log::debug!("int_pin(sim): GPIO{} enabled", self.gpio);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), LineError> {
        LINE_ENABLED.store(false, Ordering::Release);
        log::debug!("int_pin(sim): GPIO{} disabled", self.gpio);
        Ok(())
    }
}
