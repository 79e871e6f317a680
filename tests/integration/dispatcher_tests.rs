//! Integration tests: pulse aggregator + dispatcher + notifier driven the
//! way the main loop drives them.

use std::cell::RefCell;

use coinbooth::app::dispatcher::{DispatchState, Dispatcher};
use coinbooth::app::events::AppEvent;
use coinbooth::app::notifier::FlushOutcome;
use coinbooth::app::ports::{Clock, HttpResponse, TransportError};
use coinbooth::config::{BoothConfig, DISPATCH_TICK_MS};
use coinbooth::pulse::PulseAggregator;
use coinbooth::scheduler::Ticker;
use coinbooth::template::UrlTemplate;

use crate::mocks::{FakeClock, MockHttp, RecordingSink};

fn config(quiet_period_ms: u32) -> BoothConfig {
    BoothConfig {
        url: UrlTemplate::parse("http://h/i?i=%d").unwrap(),
        quiet_period_ms,
    }
}

/// Tick every 10 ms over `[from, to]`, returning (time, outcome) of each flush.
fn run_ticks(
    from: u64,
    to: u64,
    pulses: &PulseAggregator,
    dispatcher: &mut Dispatcher,
    http: &mut MockHttp<'_>,
    sink: &mut RecordingSink,
) -> Vec<(u64, FlushOutcome)> {
    let mut flushes = Vec::new();
    let mut now = from;
    while now <= to {
        if let Some(outcome) = dispatcher.tick(now, pulses, http, sink) {
            flushes.push((now, outcome));
        }
        now += DISPATCH_TICK_MS;
    }
    flushes
}

#[test]
fn three_spaced_pulses_flush_once_after_quiet_period() {
    let pulses = PulseAggregator::new(300);
    let mut d = Dispatcher::new(&config(300));
    let mut http = MockHttp::default();
    let mut sink = RecordingSink::default();

    for t in [1000, 1020, 1040] {
        assert!(pulses.on_pulse_edge(t));
    }
    assert_eq!(pulses.snapshot().flush_deadline_ms, 1340);

    let flushes = run_ticks(1000, 2000, &pulses, &mut d, &mut http, &mut sink);
    assert_eq!(flushes, vec![(1340, FlushOutcome::Delivered { status: 200 })]);
    assert_eq!(http.urls, vec!["http://h/i?i=3".to_string()]);
    assert_eq!(d.stats().units_delivered, 3);
}

#[test]
fn bounce_within_window_counts_once() {
    let pulses = PulseAggregator::new(300);
    let mut d = Dispatcher::new(&config(300));
    let mut http = MockHttp::default();
    let mut sink = RecordingSink::default();

    assert!(pulses.on_pulse_edge(500));
    assert!(!pulses.on_pulse_edge(505));
    assert_eq!(pulses.pending(), 1);

    run_ticks(500, 1000, &pulses, &mut d, &mut http, &mut sink);
    assert_eq!(http.urls, vec!["http://h/i?i=1".to_string()]);
}

#[test]
fn pending_event_precedes_flush() {
    let pulses = PulseAggregator::new(100);
    let mut d = Dispatcher::new(&config(100));
    let mut http = MockHttp::default();
    let mut sink = RecordingSink::default();

    pulses.on_pulse_edge(0);
    run_ticks(0, 200, &pulses, &mut d, &mut http, &mut sink);

    let kinds: Vec<&str> = sink
        .events
        .iter()
        .map(|e| match e {
            AppEvent::PulsesPending { .. } => "pending",
            AppEvent::FlushStarted { .. } => "started",
            AppEvent::FlushDelivered { .. } => "delivered",
            _ => "other",
        })
        .collect();
    assert_eq!(kinds, vec!["pending", "started", "delivered"]);
    assert_eq!(d.state(), DispatchState::Idle);
}

#[test]
fn pulse_during_request_starts_new_cycle() {
    let pulses = PulseAggregator::new(300);
    let mut d = Dispatcher::new(&config(300));
    let seen_during_io = RefCell::new(Vec::new());
    let mut http = MockHttp::default();
    http.during_request = Some(Box::new(|| {
        // The claimed count is already zero while the request is in flight.
        seen_during_io.borrow_mut().push(pulses.pending());
        pulses.on_pulse_edge(2000);
    }));
    let mut sink = RecordingSink::default();

    pulses.on_pulse_edge(1000);
    pulses.on_pulse_edge(1100);
    let first = d.tick(1400, &pulses, &mut http, &mut sink);
    assert_eq!(first, Some(FlushOutcome::Delivered { status: 200 }));
    assert_eq!(pulses.pending(), 1);

    // Next cycle flushes only the pulse from during the request.
    http.during_request = None;
    assert_eq!(d.tick(2299, &pulses, &mut http, &mut sink), None);
    assert!(d.tick(2300, &pulses, &mut http, &mut sink).is_some());

    assert_eq!(*seen_during_io.borrow(), vec![0]);
    assert_eq!(
        http.urls,
        vec!["http://h/i?i=2".to_string(), "http://h/i?i=1".to_string()]
    );
}

#[test]
fn zero_quiet_period_flushes_on_next_tick() {
    let pulses = PulseAggregator::new(0);
    let mut d = Dispatcher::new(&config(0));
    let mut http = MockHttp::default();
    let mut sink = RecordingSink::default();

    pulses.on_pulse_edge(42);
    assert!(d.tick(42, &pulses, &mut http, &mut sink).is_some());
    assert_eq!(http.urls, vec!["http://h/i?i=1".to_string()]);
}

#[test]
fn rejected_flush_is_dropped_without_retry() {
    let pulses = PulseAggregator::new(300);
    let mut d = Dispatcher::new(&config(300));
    let mut http = MockHttp::replying(500);
    let mut sink = RecordingSink::default();

    pulses.on_pulse_edge(0);
    pulses.on_pulse_edge(50);
    let flushes = run_ticks(0, 3000, &pulses, &mut d, &mut http, &mut sink);
    assert_eq!(flushes, vec![(350, FlushOutcome::Rejected { status: 500 })]);
    assert_eq!(pulses.pending(), 0);
    assert_eq!(http.urls.len(), 1);
    assert_eq!(d.stats().units_dropped, 2);

    // The next pulse starts a fresh cycle with only its own count.
    pulses.on_pulse_edge(4000);
    run_ticks(4000, 5000, &pulses, &mut d, &mut http, &mut sink);
    assert_eq!(http.urls.last().map(String::as_str), Some("http://h/i?i=1"));
}

#[test]
fn transport_failure_is_dropped() {
    let pulses = PulseAggregator::new(0);
    let mut d = Dispatcher::new(&config(0));
    let mut http = MockHttp::default();
    http.replies.push_back(Err(TransportError::ConnectFailed));
    let mut sink = RecordingSink::default();

    pulses.on_pulse_edge(0);
    assert_eq!(
        d.tick(0, &pulses, &mut http, &mut sink),
        Some(FlushOutcome::TransportFailed)
    );
    assert!(sink.events.contains(&AppEvent::FlushTransportFailed {
        amount: 1,
        reason: "connection failed".into()
    }));
    assert_eq!(d.stats().failed, 1);
    assert_eq!(pulses.pending(), 0);
}

#[test]
fn delivered_body_is_reported() {
    let pulses = PulseAggregator::new(0);
    let mut d = Dispatcher::new(&config(0));
    let mut http = MockHttp::default();
    http.replies.push_back(Ok(HttpResponse {
        status: 204,
        body: "limit=7".into(),
    }));
    let mut sink = RecordingSink::default();

    pulses.on_pulse_edge(0);
    d.tick(0, &pulses, &mut http, &mut sink);
    assert!(sink.events.contains(&AppEvent::FlushDelivered {
        amount: 1,
        status: 204,
        body: "limit=7".into()
    }));
}

#[test]
fn ticker_driven_loop_flushes_burst() {
    let clock = FakeClock::at(0);
    let pulses = PulseAggregator::new(300);
    let mut d = Dispatcher::new(&config(300));
    let mut http = MockHttp::default();
    let mut sink = RecordingSink::default();
    let mut ticker = Ticker::new(DISPATCH_TICK_MS, 100, 0);

    let edges = [15u64, 40, 65, 90];
    let mut heartbeats = 0;
    for _ in 0..200 {
        let tick = ticker.wait(&clock);
        let window = tick.now_ms.saturating_sub(DISPATCH_TICK_MS)..tick.now_ms;
        for &e in edges.iter().filter(|&&e| window.contains(&e)) {
            pulses.on_pulse_edge(e);
        }
        d.tick(tick.now_ms, &pulses, &mut http, &mut sink);
        if tick.heartbeat {
            heartbeats += 1;
        }
    }

    assert_eq!(http.urls, vec!["http://h/i?i=4".to_string()]);
    assert_eq!(heartbeats, 2);
    assert_eq!(clock.now_ms(), 2000);
}
