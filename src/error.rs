//! Unified error type for the coin booth firmware.
//!
//! Each port has its own small error enum. Steps that cross more than one
//! port (store a portal submission, run the manual portal) return this type
//! so the boot flow can decide per subsystem. Template and HTTP failures
//! never leave their callers: a bad template keeps the stored one and a
//! failed request is counted by the dispatcher.

use core::fmt;

use crate::app::ports::{ProvisioningError, StorageError};

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The config store could not be read or written.
    Storage(StorageError),
    /// WiFi or the portal failed.
    Provisioning(ProvisioningError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Provisioning(e) => write!(f, "provisioning: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ProvisioningError> for Error {
    fn from(e: ProvisioningError) -> Self {
        Self::Provisioning(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
