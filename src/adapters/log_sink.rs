//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC in production). One tagged line per
//! event so the serial console can be grepped by subsystem.

use log::{info, warn};

use crate::app::events::{AppEvent, BootStage};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::PulsesPending {
                pending,
                flush_deadline_ms,
            } => {
                info!("PULSE | pending={} flush_at={}ms", pending, flush_deadline_ms);
            }
            AppEvent::FlushStarted { amount, url } => {
                info!("FLUSH | amount={} GET {}", amount, url);
            }
            AppEvent::FlushDelivered {
                amount,
                status,
                body,
            } => {
                info!("FLUSH | amount={} delivered HTTP {} | {}", amount, status, body);
            }
            AppEvent::FlushRejected { amount, status } => {
                warn!("FLUSH | amount={} rejected HTTP {} (dropped)", amount, status);
            }
            AppEvent::FlushTransportFailed { amount, reason } => {
                warn!("FLUSH | amount={} failed: {} (dropped)", amount, reason);
            }
            AppEvent::ConfigLoaded(cfg) => {
                info!(
                    "CONFIG | url={} waittime={}ms",
                    cfg.url, cfg.quiet_period_ms
                );
            }
            AppEvent::ConfigSaved {
                url,
                quiet_period_ms,
            } => {
                info!("CONFIG | saved url={} waittime={}ms", url, quiet_period_ms);
            }
            AppEvent::ConfigFieldRejected { id, reason } => {
                warn!("CONFIG | field '{}' rejected: {}", id, reason);
            }
            AppEvent::Boot(stage) => match stage {
                BootStage::AutoConnectFailed
                | BootStage::ManualPortalFailed
                | BootStage::ConnectivityLost => warn!("BOOT | {:?}", stage),
                _ => info!("BOOT | {:?}", stage),
            },
        }
    }
}
