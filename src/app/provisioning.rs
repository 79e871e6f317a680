//! Provisioning glue. Loads [`BoothConfig`] from the store, builds the portal
//! fields, and persists what the operator submitted.
//!
//! The field descriptors are plain values built on demand and dropped after
//! the portal call that uses them.

use core::fmt::Write;

use log::{info, warn};

use crate::config::{
    BoothConfig, DEFAULT_QUIET_PERIOD_MS, DEFAULT_URL_TEMPLATE, URL_KEY, WAIT_TIME_KEY,
};
use crate::error::Result;
use crate::template::UrlTemplate;

use super::events::AppEvent;
use super::ports::{ConfigStore, EventSink, FieldValue, PortalField, StorageError};

pub const URL_LABEL: &str = "Url the Coin Acceptor calls to increase print limit. \
    Must contain one %d placeholder, e.g. http://photobooth.local/commands/increase-print?i=%d";
pub const WAIT_TIME_LABEL: &str = "Time between Pulses of the coin acceptor (ms)";

/// Read the stored configuration, falling back to defaults field by field.
pub fn load_config(store: &impl ConfigStore) -> BoothConfig {
    let url = match store.get_str_or(URL_KEY, DEFAULT_URL_TEMPLATE) {
        Ok(raw) => UrlTemplate::parse(&raw).unwrap_or_else(|e| {
            warn!("Config: stored url '{}' invalid ({}), using default", raw, e);
            UrlTemplate::default()
        }),
        Err(e) => {
            warn!("Config: url read failed ({}), using default", e);
            UrlTemplate::default()
        }
    };

    let quiet_period_ms = match store.get_i32(WAIT_TIME_KEY) {
        Ok(Some(ms)) => ms.max(0) as u32,
        Ok(None) => DEFAULT_QUIET_PERIOD_MS,
        Err(StorageError::TypeMismatch) => {
            warn!("Config: stored waittime malformed, treating as 0");
            0
        }
        Err(e) => {
            warn!("Config: waittime read failed ({}), using default", e);
            DEFAULT_QUIET_PERIOD_MS
        }
    };

    BoothConfig {
        url,
        quiet_period_ms,
    }
}

/// The two editable portal fields, seeded from `config`.
pub fn portal_fields(config: &BoothConfig) -> [PortalField; 2] {
    let mut url = heapless::String::new();
    // The template is bounded by the same length as the field.
    let _ = url.push_str(config.url.as_str());

    let mut wait = heapless::String::new();
    let _ = write!(wait, "{}", config.quiet_period_ms);

    [
        PortalField {
            id: URL_KEY,
            label: URL_LABEL,
            value: url,
        },
        PortalField {
            id: WAIT_TIME_KEY,
            label: WAIT_TIME_LABEL,
            value: wait,
        },
    ]
}

/// Persist the submitted values and return the resulting configuration.
///
/// A malformed URL template is not written; the stored value stays in force.
pub fn apply_submission(
    store: &mut impl ConfigStore,
    values: &[FieldValue],
    sink: &mut impl EventSink,
) -> Result<BoothConfig> {
    for field in values {
        match field.id.as_str() {
            URL_KEY => match UrlTemplate::parse(field.value.trim()) {
                Ok(template) => store.put_str(URL_KEY, template.as_str())?,
                Err(e) => {
                    warn!("Config: rejected url '{}': {}", field.value, e);
                    sink.emit(&AppEvent::ConfigFieldRejected {
                        id: field.id.clone(),
                        reason: e.to_string(),
                    });
                }
            },
            WAIT_TIME_KEY => {
                let ms = parse_wait_time(&field.value);
                store.put_i32(WAIT_TIME_KEY, ms)?;
            }
            other => {
                warn!("Config: unhandled parameter '{}' = '{}'", other, field.value);
            }
        }
    }

    let config = load_config(store);
    info!(
        "Config: saved url={} waittime={}ms",
        config.url, config.quiet_period_ms
    );
    sink.emit(&AppEvent::ConfigSaved {
        url: config.url.as_str().into(),
        quiet_period_ms: config.quiet_period_ms,
    });
    Ok(config)
}

/// Leading-integer parse of a wait time; anything unparsable is 0.
///
/// Leading whitespace and a sign are accepted, trailing garbage is ignored,
/// negative values clamp to 0 and overflow saturates.
pub fn parse_wait_time(raw: &str) -> i32 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i32 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i32::from(b - b'0'));
    }

    if negative { 0 } else { value }
}
