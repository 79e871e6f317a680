//! Integration tests: provisioning through the host backends of the real
//! adapters (simulated NVS, simulated WiFi, portal form decoding).

use coinbooth::adapters::nvs::NvsAdapter;
use coinbooth::adapters::portal_form::{parse_form, render_form};
use coinbooth::adapters::wifi::{SimNetwork, WifiAdapter};
use coinbooth::app::boot::{self, BootOutcome};
use coinbooth::app::ports::{ConfigStore, FieldValue, ProvisioningPort};
use coinbooth::app::provisioning::{apply_submission, load_config, portal_fields};
use coinbooth::config::{NVS_NAMESPACE, URL_KEY, WAIT_TIME_KEY};

use crate::mocks::{FakeClock, RecordingSink, ScriptedButton};

#[test]
fn config_round_trips_through_store() {
    let mut store = NvsAdapter::open(NVS_NAMESPACE).unwrap();
    let mut sink = RecordingSink::default();

    let saved = apply_submission(
        &mut store,
        &[
            FieldValue::new(URL_KEY, "http://booth.lan/print?add=%d"),
            FieldValue::new(WAIT_TIME_KEY, "650"),
        ],
        &mut sink,
    )
    .unwrap();

    assert_eq!(load_config(&store), saved);
    assert_eq!(saved.quiet_period_ms, 650);
    assert_eq!(saved.url.render(2).as_str(), "http://booth.lan/print?add=2");
}

#[test]
fn unknown_fields_are_ignored() {
    let mut store = NvsAdapter::open(NVS_NAMESPACE).unwrap();
    let cfg = apply_submission(
        &mut store,
        &[FieldValue::new("colour", "blue")],
        &mut RecordingSink::default(),
    )
    .unwrap();
    assert_eq!(cfg, load_config(&store));
    assert_eq!(store.get_str("colour"), Ok(None));
}

#[test]
fn garbage_wait_time_is_stored_as_zero() {
    let mut store = NvsAdapter::open(NVS_NAMESPACE).unwrap();
    let cfg = apply_submission(
        &mut store,
        &[FieldValue::new(WAIT_TIME_KEY, "soon")],
        &mut RecordingSink::default(),
    )
    .unwrap();
    assert_eq!(cfg.quiet_period_ms, 0);
    assert_eq!(store.get_i32(WAIT_TIME_KEY), Ok(Some(0)));
}

#[test]
fn first_boot_portal_submission_configures_booth() {
    // Operator fills in the page served by the autoconnect portal.
    let store_seed = NvsAdapter::open(NVS_NAMESPACE).unwrap();
    let page = render_form("Muenzeinwurf_Auto", &portal_fields(&load_config(&store_seed)), None);
    assert!(page.contains("increase-print?i=%d"));

    let body = "ssid=BoothNet&password=hunter2hunter2\
                &url=http%3A%2F%2Fbooth.lan%2Fadd%3Fi%3D%25d&waittime=250";
    let mut sim = SimNetwork {
        reachable_ssid: Some("BoothNet".into()),
        ..Default::default()
    };
    sim.portal_replies.push_back(parse_form(body).unwrap());

    let mut wifi = WifiAdapter::new(sim).unwrap();
    let mut store = store_seed;
    let outcome = boot::run(
        &mut store,
        &mut wifi,
        &mut ScriptedButton::default(),
        &FakeClock::default(),
        &mut RecordingSink::default(),
    );

    let BootOutcome::Ready(config) = outcome else {
        panic!("expected Ready, got {outcome:?}");
    };
    assert_eq!(config.url.as_str(), "http://booth.lan/add?i=%d");
    assert_eq!(config.quiet_period_ms, 250);
    assert!(wifi.is_connected());
    assert_eq!(wifi.sim().portals_opened, 1);
}

#[test]
fn unreachable_network_without_operator_halts() {
    let mut store = NvsAdapter::open(NVS_NAMESPACE).unwrap();
    let mut wifi = WifiAdapter::new(SimNetwork::default()).unwrap();

    let outcome = boot::run(
        &mut store,
        &mut wifi,
        &mut ScriptedButton::default(),
        &FakeClock::default(),
        &mut RecordingSink::default(),
    );

    assert_eq!(outcome, BootOutcome::Halt);
    let sim = wifi.sim();
    // The first-boot portal waited without a deadline and, once it closed,
    // took the soft-AP down before the booth halts.
    assert_eq!(sim.portals_opened, 1);
    assert_eq!(sim.last_portal_timeout_ms, None);
    assert!(!sim.ap_up);
}
