//! Interrupt-masking raw mutex for state shared with GPIO ISRs.
//!
//! [`IsrRawMutex`] plugs into `embassy_sync::blocking_mutex::Mutex`. Taking
//! the lock masks interrupts instead of blocking on a FreeRTOS mutex, so the
//! same lock is valid from task context and from inside an ISR.
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::hal::interrupt::free`, an
//!   ISR-capable critical section. Nesting is allowed.
//! - **all other targets**: `critical_section::with`, backed by the `std`
//!   implementation in host tests.
//!
//! Keep sections short: a pulse edge arriving while the lock is held is
//! serviced when it is released.

use embassy_sync::blocking_mutex::raw::RawMutex;

/// Raw mutex whose lock is an interrupt-free section.
pub struct IsrRawMutex(());

impl IsrRawMutex {
    pub const fn new() -> Self {
        Self(())
    }
}

impl Default for IsrRawMutex {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: `lock` runs `f` with interrupts masked (device) or inside the
// global critical section (host); no other holder can run concurrently.
unsafe impl RawMutex for IsrRawMutex {
    const INIT: Self = Self::new();

    #[cfg(target_os = "espidf")]
    fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
        esp_idf_svc::hal::interrupt::free(f)
    }

    #[cfg(not(target_os = "espidf"))]
    fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
        critical_section::with(|_| f())
    }
}

/// Blocking mutex that ISRs and tasks can both lock.
pub type IsrMutex<T> = embassy_sync::blocking_mutex::Mutex<IsrRawMutex, T>;
