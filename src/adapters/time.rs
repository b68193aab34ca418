//! Time adapter: monotonic uptime plus the blocking delay the dispatcher
//! pauses with.
//!
//! - **`target_os = "espidf"`**: uptime from `esp_timer_get_time()`,
//!   delays yield to FreeRTOS via `esp_idf_hal::delay::FreeRtos`.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `std::thread::sleep` for the host simulator.

use embedded_hal::delay::DelayNs;

/// Monotonic clock and [`DelayNs`] source.
pub struct SystemDelay {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemDelay {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        // SAFETY: reads the free-running high-resolution timer.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since the adapter was created (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    /// Milliseconds elapsed since `since_us`.
    pub fn elapsed_ms(&self, since_us: u64) -> u64 {
        self.uptime_us().saturating_sub(since_us) / 1_000
    }
}

#[cfg(target_os = "espidf")]
impl DelayNs for SystemDelay {
    fn delay_ns(&mut self, ns: u32) {
        esp_idf_hal::delay::FreeRtos.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayNs for SystemDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(core::time::Duration::from_nanos(u64::from(ns)));
    }
}
