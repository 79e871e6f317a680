//! Dispatch-loop heartbeat: task watchdog feed plus the periodic status line.
//!
//! The main task subscribes to the ESP-IDF Task Watchdog once the boot
//! sequence is over. Each heartbeat (every [`HEARTBEAT_TICKS`] dispatch
//! ticks) resets it and logs the dispatcher counters. A flush blocked on the
//! HTTP client delays the next heartbeat by at most [`HTTP_TIMEOUT_MS`], so
//! [`WATCHDOG_TIMEOUT_MS`] only fires when the loop itself is wedged.
//!
//! The status line is `info` when something was flushed since the previous
//! beat and `debug` otherwise, so an idle booth stays quiet on the console.
//!
//! [`HEARTBEAT_TICKS`]: crate::config::HEARTBEAT_TICKS
//! [`HTTP_TIMEOUT_MS`]: crate::config::HTTP_TIMEOUT_MS

use core::fmt;

use log::{debug, info};

use crate::app::dispatcher::{DispatchState, DispatchStats};
use crate::config::WATCHDOG_TIMEOUT_MS;

/// Snapshot logged on every heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatReport {
    pub pending: u32,
    pub state: DispatchState,
    pub stats: DispatchStats,
    pub skipped_ticks: u64,
}

impl fmt::Display for HeartbeatReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HEARTBEAT | pending={} state={:?} flushes={} delivered={} failed={} \
             units={} dropped={} skipped_ticks={}",
            self.pending,
            self.state,
            self.stats.flushes,
            self.stats.delivered,
            self.stats.failed,
            self.stats.units_delivered,
            self.stats.units_dropped,
            self.skipped_ticks,
        )
    }
}

pub struct Heartbeat {
    subscribed: bool,
    beats: u64,
    last_flushes: u32,
}

impl Heartbeat {
    /// Subscribe the calling task to the TWDT (panic on trigger).
    ///
    /// A failed subscription is logged; the loop still runs unguarded.
    pub fn start() -> Self {
        let subscribed = subscribe_current_task();
        Self {
            subscribed,
            beats: 0,
            last_flushes: 0,
        }
    }

    /// Feed the watchdog and log `report`.
    pub fn beat(&mut self, report: &HeartbeatReport) {
        if self.subscribed {
            feed_watchdog();
        }
        self.beats += 1;

        if report.stats.flushes != self.last_flushes {
            self.last_flushes = report.stats.flushes;
            info!("{}", report);
        } else {
            debug!("{}", report);
        }
    }

    /// Heartbeats since [`start`](Self::start).
    pub fn beats(&self) -> u64 {
        self.beats
    }

    pub fn is_guarded(&self) -> bool {
        self.subscribed
    }
}

#[cfg(target_os = "espidf")]
fn subscribe_current_task() -> bool {
    use esp_idf_svc::sys::{
        ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure,
    };

    let cfg = esp_task_wdt_config_t {
        timeout_ms: WATCHDOG_TIMEOUT_MS,
        idle_core_mask: 0,
        trigger_panic: true,
    };
    // SAFETY: plain FFI calls with a valid config; a null handle means the
    // calling task.
    let (reconfigured, added) = unsafe {
        (
            esp_task_wdt_reconfigure(&cfg),
            esp_task_wdt_add(core::ptr::null_mut()),
        )
    };
    if reconfigured != ESP_OK as i32 {
        log::warn!("Heartbeat: TWDT reconfigure returned {}", reconfigured);
    }
    if added != ESP_OK as i32 {
        log::warn!("Heartbeat: TWDT subscribe failed ({}), loop unguarded", added);
        return false;
    }
    info!("Heartbeat: TWDT armed ({}ms, panic on trigger)", WATCHDOG_TIMEOUT_MS);
    true
}

#[cfg(not(target_os = "espidf"))]
fn subscribe_current_task() -> bool {
    info!("Heartbeat(sim): TWDT stand-in ({}ms)", WATCHDOG_TIMEOUT_MS);
    true
}

#[cfg(target_os = "espidf")]
fn feed_watchdog() {
    // SAFETY: only called after a successful esp_task_wdt_add on this task.
    unsafe {
        esp_idf_svc::sys::esp_task_wdt_reset();
    }
}

#[cfg(not(target_os = "espidf"))]
fn feed_watchdog() {}
