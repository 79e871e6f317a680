//! Terminal platform actions requested by the boot sequence.

use log::error;

/// Reboot the chip.
#[cfg(target_os = "espidf")]
pub fn restart() -> ! {
    error!("System: restarting");
    esp_idf_svc::hal::reset::restart()
}

/// Stop doing anything until the next power cycle.
#[cfg(target_os = "espidf")]
pub fn halt() -> ! {
    error!("System: halted, power cycle to retry");
    loop {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(1000);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn restart() -> ! {
    error!("System(sim): restart requested");
    std::process::exit(1)
}

#[cfg(not(target_os = "espidf"))]
pub fn halt() -> ! {
    error!("System(sim): halt requested");
    std::process::exit(2)
}
