//! ESP32 time adapter.
//!
//! Monotonic milliseconds for the pulse ISR, the dispatcher and the boot
//! window.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()` (microsecond
//!   precision, monotonic, safe to call from ISR context).
//! - **`not(target_os = "espidf")`**: `std::time::Instant` anchored at the
//!   first call, for host-side simulation.

use crate::app::ports::Clock;

/// Milliseconds since boot.
#[cfg(target_os = "espidf")]
pub fn uptime_ms() -> u64 {
    // SAFETY: esp_timer_get_time reads the RTC counter; ISR-safe.
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
}

/// Milliseconds since the first call in this process.
#[cfg(not(target_os = "espidf"))]
pub fn uptime_ms() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_millis() as u64
}

/// [`Clock`] backed by [`uptime_ms`] and a FreeRTOS-friendly sleep.
#[derive(Debug, Default, Clone, Copy)]
pub struct Esp32TimeAdapter;

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for Esp32TimeAdapter {
    fn now_ms(&self) -> u64 {
        uptime_ms()
    }

    #[cfg(target_os = "espidf")]
    fn sleep_ms(&self, ms: u64) {
        // Yields to the scheduler; granularity is one FreeRTOS tick.
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms.min(u64::from(u32::MAX)) as u32);
    }

    #[cfg(not(target_os = "espidf"))]
    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}
