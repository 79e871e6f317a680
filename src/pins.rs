//! GPIO assignments for the coin booth controller board.
//!
//! Every driver references this module rather than hard-coding pin numbers.

/// Coin acceptor pulse output. Each accepted coin unit produces one
/// rising edge; the line idles low.
pub const PULSE_GPIO: i32 = 2;

/// Reprovision push-button, active low with the internal pull-up enabled.
/// Sampled only during the boot window.
pub const REPROVISION_GPIO: i32 = 10;

/// A peripheral handed to a driver is not the GPIO the board wires it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMismatch {
    pub role: &'static str,
    pub expected: i32,
    pub actual: i32,
}

impl core::fmt::Display for PinMismatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} wired to GPIO{}, board expects GPIO{}",
            self.role, self.actual, self.expected
        )
    }
}

impl std::error::Error for PinMismatch {}

/// Check that the pin a driver received matches the board assignment.
pub fn expect_pin(role: &'static str, expected: i32, actual: i32) -> Result<(), PinMismatch> {
    if actual == expected {
        Ok(())
    } else {
        Err(PinMismatch {
            role,
            expected,
            actual,
        })
    }
}
