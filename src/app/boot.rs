//! Boot sequence: connectivity, optional manual reprovisioning, config load.
//!
//! | Step | Action                                      | On failure              |
//! |------|---------------------------------------------|-------------------------|
//! | 1    | autoconnect (portal `Muenzeinwurf_Auto`)    | [`BootOutcome::Halt`]   |
//! | 2    | persist returned portal values              | logged, boot continues  |
//! | 3    | sample button 5 s; manual portal on press   | [`BootOutcome::Restart`]|
//! | 4    | check connectivity                          | [`BootOutcome::Restart`]|
//! | 5    | reload config from the store                | defaults per field      |
//!
//! The caller (main) turns `Halt` / `Restart` into the platform action, so
//! the whole sequence runs against mocks on the host.

use log::{error, info, warn};

use crate::config::{
    AUTO_PORTAL_AP, BoothConfig, MANUAL_PORTAL_AP, REPROVISION_POLL_MS, REPROVISION_WINDOW_MS,
};
use crate::error::{Error, Result};

use super::events::{AppEvent, BootStage};
use super::ports::{
    Clock, ConfigStore, EventSink, FieldValue, ProvisioningPort, ReprovisionButton,
};
use super::provisioning::{apply_submission, load_config, portal_fields};

/// What the platform must do once the boot sequence returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootOutcome {
    /// Connected and configured; start counting.
    Ready(BoothConfig),
    /// Initial connection failed; wait for a power cycle.
    Halt,
    /// Manual portal failed or connectivity lost; reboot.
    Restart,
}

pub fn run(
    store: &mut impl ConfigStore,
    portal: &mut impl ProvisioningPort,
    button: &mut impl ReprovisionButton,
    clock: &impl Clock,
    sink: &mut impl EventSink,
) -> BootOutcome {
    // 1. Autoconnect, opening the portal if the stored network is unreachable.
    sink.emit(&AppEvent::Boot(BootStage::AutoConnecting));
    let fields = portal_fields(&load_config(store));
    let values = match portal.auto_connect(AUTO_PORTAL_AP, &fields) {
        Ok(values) => values,
        Err(e) => {
            error!("Boot: autoconnect failed ({}), halting", e);
            sink.emit(&AppEvent::Boot(BootStage::AutoConnectFailed));
            return BootOutcome::Halt;
        }
    };
    drop(fields);

    // 2. Persist whatever the portal returned.
    persist(store, &values, sink);

    // 3. Manual reprovisioning window.
    info!("Boot: waiting {}ms for manual setup", REPROVISION_WINDOW_MS);
    sink.emit(&AppEvent::Boot(BootStage::WaitingForReprovision));
    let deadline = clock.now_ms() + REPROVISION_WINDOW_MS;
    while clock.now_ms() < deadline {
        if button.is_pressed() {
            info!("Boot: starting manual config portal");
            sink.emit(&AppEvent::Boot(BootStage::ManualPortalOpened));
            match manual_portal(store, portal, sink) {
                Ok(()) => {}
                Err(e @ Error::Storage(_)) => warn!("Boot: saving portal values failed ({})", e),
                Err(e @ Error::Provisioning(_)) => {
                    error!("Boot: manual portal failed ({}), restarting", e);
                    sink.emit(&AppEvent::Boot(BootStage::ManualPortalFailed));
                    return BootOutcome::Restart;
                }
            }
            break;
        }
        clock.sleep_ms(REPROVISION_POLL_MS);
    }
    info!("Boot: finished manual setup");

    // 4. Connectivity must still be up.
    if !portal.is_connected() {
        error!("Boot: WiFi not connected, press reset button to set up WiFi; restarting");
        sink.emit(&AppEvent::Boot(BootStage::ConnectivityLost));
        return BootOutcome::Restart;
    }

    // 5. Final configuration.
    let config = load_config(store);
    sink.emit(&AppEvent::ConfigLoaded(config.clone()));
    sink.emit(&AppEvent::Boot(BootStage::Ready));
    BootOutcome::Ready(config)
}

/// Serve the manual portal and store what the operator submitted.
fn manual_portal(
    store: &mut impl ConfigStore,
    portal: &mut impl ProvisioningPort,
    sink: &mut impl EventSink,
) -> Result<()> {
    let fields = portal_fields(&load_config(store));
    let values = portal.start_portal(MANUAL_PORTAL_AP, &fields)?;
    apply_submission(store, &values, sink)?;
    Ok(())
}

fn persist(store: &mut impl ConfigStore, values: &[FieldValue], sink: &mut impl EventSink) {
    if let Err(e) = apply_submission(store, values, sink) {
        warn!("Boot: saving portal values failed ({})", e);
    }
}
