//! Reprovision push-button.
//!
//! Active-low momentary switch on [`REPROVISION_GPIO`](crate::pins::REPROVISION_GPIO)
//! with the internal pull-up. The boot sequence polls it every few
//! milliseconds during a short window, so there is no ISR and no gesture
//! detection: a single low sample counts as a press.

use embedded_hal::digital::{Error as _, InputPin};
use log::warn;

use crate::app::ports::ReprovisionButton;

pub struct ActiveLowButton<P> {
    pin: P,
}

impl<P: InputPin> ActiveLowButton<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> ReprovisionButton for ActiveLowButton<P> {
    fn is_pressed(&mut self) -> bool {
        match self.pin.is_low() {
            Ok(low) => low,
            Err(e) => {
                warn!("Button: read failed ({:?})", e.kind());
                false
            }
        }
    }
}

/// Build the button on the board's reprovision GPIO.
///
/// Fails if `pin` is not [`REPROVISION_GPIO`](crate::pins::REPROVISION_GPIO).
#[cfg(target_os = "espidf")]
pub fn reprovision_button(
    pin: esp_idf_svc::hal::gpio::AnyIOPin,
) -> anyhow::Result<
    ActiveLowButton<
        esp_idf_svc::hal::gpio::PinDriver<
            'static,
            esp_idf_svc::hal::gpio::AnyIOPin,
            esp_idf_svc::hal::gpio::Input,
        >,
    >,
> {
    use esp_idf_svc::hal::gpio::{Pin, PinDriver, Pull};

    crate::pins::expect_pin("reprovision button", crate::pins::REPROVISION_GPIO, pin.pin())?;
    let mut driver = PinDriver::input(pin)?;
    driver.set_pull(Pull::Up)?;
    Ok(ActiveLowButton::new(driver))
}
