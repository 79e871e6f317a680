//! Integration tests: boot sequence against a scripted portal, button and
//! clock.

use coinbooth::app::boot::{self, BootOutcome};
use coinbooth::app::events::{AppEvent, BootStage};
use coinbooth::app::ports::{Clock, FieldValue, ProvisioningError};
use coinbooth::config::{
    AUTO_PORTAL_AP, BoothConfig, MANUAL_PORTAL_AP, REPROVISION_WINDOW_MS, URL_KEY, WAIT_TIME_KEY,
};

use crate::mocks::{FakeClock, MemStore, RecordingSink, ScriptedButton, ScriptedPortal, Stored};

fn stages(sink: &RecordingSink) -> Vec<BootStage> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Boot(stage) => Some(*stage),
            _ => None,
        })
        .collect()
}

#[test]
fn clean_boot_is_ready_with_defaults() {
    let mut store = MemStore::default();
    let mut portal = ScriptedPortal::online();
    let mut button = ScriptedButton::default();
    let clock = FakeClock::at(2000);
    let mut sink = RecordingSink::default();

    let outcome = boot::run(&mut store, &mut portal, &mut button, &clock, &mut sink);

    assert_eq!(outcome, BootOutcome::Ready(BoothConfig::default()));
    assert_eq!(portal.calls.len(), 1);
    assert_eq!(portal.calls[0].ap_name, AUTO_PORTAL_AP);
    // The whole reprovision window was sampled.
    assert_eq!(clock.now_ms() - 2000, REPROVISION_WINDOW_MS);
    assert_eq!(button.polls, 500);
    assert_eq!(
        stages(&sink),
        vec![
            BootStage::AutoConnecting,
            BootStage::WaitingForReprovision,
            BootStage::Ready
        ]
    );
}

#[test]
fn portal_fields_are_seeded_from_store() {
    let mut store = MemStore::default();
    store
        .values
        .insert(URL_KEY.into(), Stored::Str("http://booth/?n=%d".into()));
    store.values.insert(WAIT_TIME_KEY.into(), Stored::I32(450));
    let mut portal = ScriptedPortal::online();

    boot::run(
        &mut store,
        &mut portal,
        &mut ScriptedButton::default(),
        &FakeClock::default(),
        &mut RecordingSink::default(),
    );

    let fields = &portal.calls[0].fields;
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].id, URL_KEY);
    assert_eq!(fields[0].value.as_str(), "http://booth/?n=%d");
    assert_eq!(fields[1].id, WAIT_TIME_KEY);
    assert_eq!(fields[1].value.as_str(), "450");
}

#[test]
fn autoconnect_failure_halts() {
    let mut store = MemStore::default();
    let mut portal = ScriptedPortal {
        auto_reply: Err(ProvisioningError::PortalTimeout),
        ..ScriptedPortal::online()
    };
    let mut button = ScriptedButton::default();
    let mut sink = RecordingSink::default();

    let outcome = boot::run(
        &mut store,
        &mut portal,
        &mut button,
        &FakeClock::default(),
        &mut sink,
    );

    assert_eq!(outcome, BootOutcome::Halt);
    assert_eq!(button.polls, 0, "button window never opens");
    assert_eq!(stages(&sink).last(), Some(&BootStage::AutoConnectFailed));
}

#[test]
fn autoconnect_portal_values_are_persisted() {
    let mut store = MemStore::default();
    let mut portal = ScriptedPortal {
        auto_reply: Ok(vec![
            FieldValue::new(URL_KEY, "http://new/?i=%d"),
            FieldValue::new(WAIT_TIME_KEY, "800"),
        ]),
        ..ScriptedPortal::online()
    };

    let outcome = boot::run(
        &mut store,
        &mut portal,
        &mut ScriptedButton::default(),
        &FakeClock::default(),
        &mut RecordingSink::default(),
    );

    let BootOutcome::Ready(config) = outcome else {
        panic!("expected Ready, got {outcome:?}");
    };
    assert_eq!(config.url.as_str(), "http://new/?i=%d");
    assert_eq!(config.quiet_period_ms, 800);
    assert_eq!(store.values.get(WAIT_TIME_KEY), Some(&Stored::I32(800)));
}

#[test]
fn button_press_opens_manual_portal_and_ends_window() {
    let mut store = MemStore::default();
    let mut portal = ScriptedPortal {
        manual_reply: Ok(vec![FieldValue::new(WAIT_TIME_KEY, "120")]),
        ..ScriptedPortal::online()
    };
    let mut button = ScriptedButton {
        press_on_poll: Some(50),
        ..Default::default()
    };
    let clock = FakeClock::at(0);
    let mut sink = RecordingSink::default();

    let outcome = boot::run(&mut store, &mut portal, &mut button, &clock, &mut sink);

    let BootOutcome::Ready(config) = outcome else {
        panic!("expected Ready, got {outcome:?}");
    };
    assert_eq!(config.quiet_period_ms, 120);
    assert_eq!(portal.manual_calls(), 1);
    assert_eq!(portal.calls[1].ap_name, MANUAL_PORTAL_AP);
    assert_eq!(button.polls, 50, "window ends after the manual portal");
    assert!(stages(&sink).contains(&BootStage::ManualPortalOpened));
}

#[test]
fn manual_portal_failure_restarts() {
    let mut store = MemStore::default();
    let mut portal = ScriptedPortal {
        manual_reply: Err(ProvisioningError::ConnectFailed),
        ..ScriptedPortal::online()
    };
    let mut button = ScriptedButton {
        press_on_poll: Some(1),
        ..Default::default()
    };
    let mut sink = RecordingSink::default();

    let outcome = boot::run(
        &mut store,
        &mut portal,
        &mut button,
        &FakeClock::default(),
        &mut sink,
    );

    assert_eq!(outcome, BootOutcome::Restart);
    assert_eq!(stages(&sink).last(), Some(&BootStage::ManualPortalFailed));
}

#[test]
fn manual_portal_save_failure_keeps_booting() {
    let mut store = MemStore {
        full: true,
        ..Default::default()
    };
    let mut portal = ScriptedPortal {
        manual_reply: Ok(vec![FieldValue::new(WAIT_TIME_KEY, "120")]),
        ..ScriptedPortal::online()
    };
    let mut button = ScriptedButton {
        press_on_poll: Some(1),
        ..Default::default()
    };
    let mut sink = RecordingSink::default();

    let outcome = boot::run(
        &mut store,
        &mut portal,
        &mut button,
        &FakeClock::default(),
        &mut sink,
    );

    // The portal itself succeeded, so this is not a restart; the booth runs
    // on what the store already held.
    assert_eq!(outcome, BootOutcome::Ready(BoothConfig::default()));
    assert_eq!(portal.manual_calls(), 1);
    assert!(!stages(&sink).contains(&BootStage::ManualPortalFailed));
}

#[test]
fn lost_connectivity_restarts() {
    let mut store = MemStore::default();
    let mut portal = ScriptedPortal {
        connected: false,
        ..ScriptedPortal::online()
    };
    let mut sink = RecordingSink::default();

    let outcome = boot::run(
        &mut store,
        &mut portal,
        &mut ScriptedButton::default(),
        &FakeClock::default(),
        &mut sink,
    );

    assert_eq!(outcome, BootOutcome::Restart);
    assert_eq!(stages(&sink).last(), Some(&BootStage::ConnectivityLost));
}

#[test]
fn malformed_url_from_portal_keeps_previous_template() {
    let mut store = MemStore::default();
    store
        .values
        .insert(URL_KEY.into(), Stored::Str("http://old/?i=%d".into()));
    let mut portal = ScriptedPortal {
        auto_reply: Ok(vec![FieldValue::new(URL_KEY, "http://new/?s=%s")]),
        ..ScriptedPortal::online()
    };
    let mut sink = RecordingSink::default();

    let outcome = boot::run(
        &mut store,
        &mut portal,
        &mut ScriptedButton::default(),
        &FakeClock::default(),
        &mut sink,
    );

    let BootOutcome::Ready(config) = outcome else {
        panic!("expected Ready, got {outcome:?}");
    };
    assert_eq!(config.url.as_str(), "http://old/?i=%d");
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ConfigFieldRejected { id, .. } if id == URL_KEY
    )));
}
