//! Coin acceptor pulse input.
//!
//! The acceptor emits one rising edge per credited unit on
//! [`PULSE_GPIO`](crate::pins::PULSE_GPIO). The GPIO ISR reads the
//! monotonic clock and feeds the edge into the process-wide [`PULSES`]
//! aggregator; everything else happens in the main loop.

use crate::config::DEFAULT_QUIET_PERIOD_MS;
use crate::pulse::PulseAggregator;

use super::hw_init::{self, HwInitError};

/// Shared between the pulse ISR and the dispatcher.
pub static PULSES: PulseAggregator = PulseAggregator::new(DEFAULT_QUIET_PERIOD_MS);

#[cfg(target_os = "espidf")]
unsafe extern "C" fn pulse_gpio_isr(_arg: *mut core::ffi::c_void) {
    PULSES.on_pulse_edge(crate::adapters::time::uptime_ms());
}

#[cfg(not(target_os = "espidf"))]
fn pulse_gpio_isr() {
    PULSES.on_pulse_edge(crate::adapters::time::uptime_ms());
}

/// Apply the loaded quiet period and start counting edges.
pub fn start(quiet_period_ms: u32) -> Result<(), HwInitError> {
    PULSES.configure(quiet_period_ms);
    hw_init::init_rising_edge_input(crate::pins::PULSE_GPIO, pulse_gpio_isr)?;
    log::info!(
        "CoinAcceptor: counting on GPIO{} (quiet period {}ms)",
        crate::pins::PULSE_GPIO,
        quiet_period_ms
    );
    Ok(())
}

/// Host stand-in for a physical edge.
#[cfg(not(target_os = "espidf"))]
pub fn simulate_pulse() {
    pulse_gpio_isr();
}
