//! Coin booth firmware, main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  NvsAdapter     WifiAdapter        HttpClientAdapter           │
//! │  (ConfigStore)  (ProvisioningPort) (HttpPort)                  │
//! │  LogEventSink   Esp32TimeAdapter   ActiveLowButton             │
//! │  (EventSink)    (Clock)            (ReprovisionButton)         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  boot::run · Dispatcher · Notifier (pure logic)        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  pulse ISR ──▶ PULSES (interrupt-masked cell) ◀── Ticker loop  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::IOPin;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use coinbooth::adapters::http::HttpClientAdapter;
use coinbooth::adapters::log_sink::LogEventSink;
use coinbooth::adapters::nvs::NvsAdapter;
use coinbooth::adapters::system;
use coinbooth::adapters::time::Esp32TimeAdapter;
use coinbooth::adapters::wifi::WifiAdapter;
use coinbooth::app::boot::{self, BootOutcome};
use coinbooth::app::dispatcher::Dispatcher;
use coinbooth::app::ports::Clock;
use coinbooth::config::{BOOT_DELAY_MS, DISPATCH_TICK_MS, HEARTBEAT_TICKS, NVS_NAMESPACE};
use coinbooth::drivers::button::reprovision_button;
use coinbooth::drivers::coin_acceptor::{self, PULSES};
use coinbooth::drivers::heartbeat::{Heartbeat, HeartbeatReport};
use coinbooth::scheduler::Ticker;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    // USB-JTAG needs a moment to enumerate before the first log line.
    FreeRtos::delay_ms(BOOT_DELAY_MS);
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Coinbooth v{}                    ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals and adapters ───────────────────────────
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    let mut store = NvsAdapter::open(nvs_partition.clone(), NVS_NAMESPACE)?;
    let mut wifi = WifiAdapter::new(peripherals.modem, sysloop, nvs_partition)?;
    // GPIO10 is pins::REPROVISION_GPIO; reprovision_button rejects any other pin.
    let mut button = reprovision_button(peripherals.pins.gpio10.downgrade())?;
    let clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new();

    // ── 3. Boot sequence ──────────────────────────────────────
    let config = match boot::run(&mut store, &mut wifi, &mut button, &clock, &mut sink) {
        BootOutcome::Ready(config) => config,
        BootOutcome::Halt => system::halt(),
        BootOutcome::Restart => system::restart(),
    };
    drop(button);

    match serde_json::to_string(&config) {
        Ok(json) => info!("Config: {}", json),
        Err(e) => warn!("Config: JSON encoding failed: {}", e),
    }

    // ── 4. Pulse input + heartbeat ────────────────────────────
    coin_acceptor::start(config.quiet_period_ms)?;
    let mut heartbeat = Heartbeat::start();

    let mut http = HttpClientAdapter::new();
    let mut dispatcher = Dispatcher::new(&config);
    let mut ticker = Ticker::new(DISPATCH_TICK_MS, HEARTBEAT_TICKS, clock.now_ms());

    info!("System ready. Entering dispatch loop.");

    // ── 5. Dispatch loop ──────────────────────────────────────
    loop {
        let tick = ticker.wait(&clock);
        dispatcher.tick(tick.now_ms, &PULSES, &mut http, &mut sink);

        if tick.heartbeat {
            heartbeat.beat(&HeartbeatReport {
                pending: PULSES.pending(),
                state: dispatcher.state(),
                stats: dispatcher.stats(),
                skipped_ticks: ticker.skipped(),
            });
        }
    }
}
