//! Booth configuration parameters
//!
//! Runtime values come from NVS (namespace [`NVS_NAMESPACE`]) and can be
//! edited through the provisioning portal. Everything else is a compile-time
//! policy constant.

use serde::{Deserialize, Serialize};

use crate::template::UrlTemplate;

// --- Persistence ---

/// NVS namespace shared with previously deployed firmware.
pub const NVS_NAMESPACE: &str = "Booth_Data";
/// Key holding the URL template (string).
pub const URL_KEY: &str = "url";
/// Key holding the quiet period in milliseconds (i32).
pub const WAIT_TIME_KEY: &str = "waittime";

/// URL called to raise the print limit when nothing is stored yet.
pub const DEFAULT_URL_TEMPLATE: &str = "http://photobooth.local/commands/increase-print?i=%d";
/// Quiet period when nothing is stored yet.
pub const DEFAULT_QUIET_PERIOD_MS: u32 = 300;

// --- Pulse handling ---

/// Contact-bounce window after an accepted pulse.
pub const DEBOUNCE_WINDOW_MS: u64 = 17;
/// Main-loop dispatch tick.
pub const DISPATCH_TICK_MS: u64 = 10;
/// Heartbeat log / watchdog feed interval, in dispatch ticks.
pub const HEARTBEAT_TICKS: u32 = 100;

// --- Boot / provisioning ---

/// Wait before logging starts so the USB-JTAG console can enumerate.
pub const BOOT_DELAY_MS: u32 = 2000;
/// Window after boot during which the reprovision button is sampled.
pub const REPROVISION_WINDOW_MS: u64 = 5000;
/// Sampling interval of the reprovision button.
pub const REPROVISION_POLL_MS: u64 = 10;
/// Soft-AP name of the portal opened when autoconnect fails.
pub const AUTO_PORTAL_AP: &str = "Muenzeinwurf_Auto";
/// Soft-AP name of the portal opened by the reprovision button.
pub const MANUAL_PORTAL_AP: &str = "Muenzeinwurf_Manual";
/// Maximum length of a portal text field.
pub const PORTAL_FIELD_MAX_LEN: usize = 100;
/// How long a portal waits for a submission before giving up.
pub const PORTAL_TIMEOUT_MS: u64 = 300_000;
/// Station connect attempts before the portal is opened.
pub const WIFI_CONNECT_RETRIES: u32 = 10;
/// Namespace holding the station credentials entered on the portal.
pub const WIFI_NVS_NAMESPACE: &str = "wifi_creds";

// --- Network ---

/// HTTP client timeout for a flush request.
pub const HTTP_TIMEOUT_MS: u64 = 10_000;
/// Response bytes kept for the diagnostic log.
pub const RESPONSE_LOG_MAX_BYTES: usize = 512;
/// Task watchdog timeout for the main loop.
pub const WATCHDOG_TIMEOUT_MS: u32 = 30_000;

/// Runtime configuration, immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoothConfig {
    /// Template of the print-limit URL.
    pub url: UrlTemplate,
    /// Inactivity after the last pulse before the count is flushed.
    pub quiet_period_ms: u32,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            url: UrlTemplate::default(),
            quiet_period_ms: DEFAULT_QUIET_PERIOD_MS,
        }
    }
}
