//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the coin booth: deciding when
//! the pulse count is final, sending it, and the provisioning glue that loads
//! and persists configuration. All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod boot;
pub mod dispatcher;
pub mod events;
pub mod notifier;
pub mod ports;
pub mod provisioning;
