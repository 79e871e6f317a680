//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a subsystem against mock
//! adapters. All tests run on the host (x86_64) with no real hardware
//! required.

mod boot_flow_tests;
mod dispatcher_tests;
mod mocks;
mod provisioning_flow_tests;
