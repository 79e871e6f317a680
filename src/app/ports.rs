//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Dispatcher / boot flow (domain)
//! ```
//!
//! Driven adapters (NVS, WiFi portal, HTTP client, clock, button, event sinks)
//! implement these traits. The domain consumes them via generics, so the
//! counting and dispatch logic never touches ESP-IDF directly.

use core::fmt;

use crate::app::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Config store (driven adapter: domain ↔ NVS)
// ───────────────────────────────────────────────────────────────

/// Typed key/value store scoped to the booth namespace.
///
/// `Ok(None)` means the key has never been written.
pub trait ConfigStore {
    fn get_str(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn put_str(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    fn get_i32(&self, key: &str) -> Result<Option<i32>, StorageError>;

    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError>;

    /// String value, or `default` when missing.
    fn get_str_or(&self, key: &str, default: &str) -> Result<String, StorageError> {
        Ok(self.get_str(key)?.unwrap_or_else(|| default.into()))
    }

    /// Integer value, or `default` when missing.
    fn get_i32_or(&self, key: &str, default: i32) -> Result<i32, StorageError> {
        Ok(self.get_i32(key)?.unwrap_or(default))
    }
}

// ───────────────────────────────────────────────────────────────
// Provisioning port (driven adapter: domain ↔ WiFi + captive portal)
// ───────────────────────────────────────────────────────────────

/// Editable field shown on the captive portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalField {
    /// Identifier; also the form field name and the NVS key.
    pub id: &'static str,
    /// Human-readable label shown above the input.
    pub label: &'static str,
    /// Pre-filled value.
    pub value: heapless::String<{ crate::config::PORTAL_FIELD_MAX_LEN }>,
}

/// Value returned by the portal for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub id: String,
    pub value: String,
}

impl FieldValue {
    pub fn new(id: &str, value: &str) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

/// Connectivity plus the operator-facing configuration portal.
pub trait ProvisioningPort {
    /// Join the stored network; open a portal named `ap_name` if that fails.
    ///
    /// Returns the field values (seeded values when no portal was needed).
    fn auto_connect(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
    ) -> Result<Vec<FieldValue>, ProvisioningError>;

    /// Unconditionally open a portal and join the network entered there.
    fn start_portal(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
    ) -> Result<Vec<FieldValue>, ProvisioningError>;

    fn is_connected(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// HTTP port (driven adapter: domain → remote booth server)
// ───────────────────────────────────────────────────────────────

/// Response of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Body, truncated to [`RESPONSE_LOG_MAX_BYTES`](crate::config::RESPONSE_LOG_MAX_BYTES).
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET.
pub trait HttpPort {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Clock and button (driven adapters used during boot)
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot plus a blocking delay.
pub trait Clock {
    fn now_ms(&self) -> u64;

    fn sleep_ms(&self, ms: u64);
}

/// Momentary control that forces a fresh provisioning portal.
pub trait ReprovisionButton {
    fn is_pressed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Stored value has a different type than requested.
    TypeMismatch,
    /// Storage partition is full.
    Full,
    /// Value or key too long for the backend.
    TooLong,
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`ProvisioningPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningError {
    /// Could not join the network after the configured retries.
    ConnectFailed,
    /// The portal closed without a submission.
    PortalTimeout,
    /// WiFi driver or HTTP server could not be started.
    DriverFailed,
}

/// Errors from [`HttpPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Client could not be created or the URL was refused.
    InvalidRequest,
    /// Connection or DNS failure.
    ConnectFailed,
    /// No response before the client timeout.
    Timeout,
    /// Connection dropped while reading.
    Io,
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch => write!(f, "stored value has a different type"),
            Self::Full => write!(f, "storage full"),
            Self::TooLong => write!(f, "value too long"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl fmt::Display for ProvisioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "WiFi connection failed"),
            Self::PortalTimeout => write!(f, "portal closed without submission"),
            Self::DriverFailed => write!(f, "WiFi / portal driver failed"),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid request"),
            Self::ConnectFailed => write!(f, "connection failed"),
            Self::Timeout => write!(f, "timed out"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for StorageError {}
impl std::error::Error for ProvisioningError {}
impl std::error::Error for TransportError {}
