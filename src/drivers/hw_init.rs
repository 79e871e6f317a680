//! One-shot GPIO initialization.
//!
//! Configures the pulse input and installs the per-pin GPIO ISR service
//! using raw ESP-IDF sys calls. Called once from `main()` after the boot
//! sequence, before the dispatch loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrHandlerFailed(rc) => write!(f, "GPIO ISR handler add failed (rc={})", rc),
        }
    }
}

impl std::error::Error for HwInitError {}

/// Handler signature accepted by `gpio_isr_handler_add`.
#[cfg(target_os = "espidf")]
pub type GpioIsr = unsafe extern "C" fn(*mut core::ffi::c_void);

// ── Rising-edge input with ISR ────────────────────────────────

/// Configure `pin` as a pulled-down input interrupting on rising edges and
/// attach `isr` to it.
#[cfg(target_os = "espidf")]
pub fn init_rising_edge_input(pin: i32, isr: GpioIsr) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_POSEDGE,
    };
    // SAFETY: called once from main() before the loop; single-threaded.
    // `isr` only touches the interrupt-masked pulse cell.
    unsafe {
        let ret = gpio_config(&cfg);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::GpioConfigFailed(ret));
        }

        // ESP_ERR_INVALID_STATE means the service is already installed.
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        let ret = gpio_isr_handler_add(pin, Some(isr), core::ptr::null_mut());
        if ret != ESP_OK as i32 {
            return Err(HwInitError::IsrHandlerFailed(ret));
        }
        gpio_intr_enable(pin);
    }
    info!("hw_init: GPIO{} rising-edge ISR installed", pin);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_rising_edge_input(pin: i32, _isr: fn()) -> Result<(), HwInitError> {
    log::info!("hw_init(sim): GPIO{} ISR skipped", pin);
    Ok(())
}
