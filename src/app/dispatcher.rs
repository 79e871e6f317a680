//! Dispatcher. Decides when pending pulses are settled and flushes them.
//!
//! ```text
//!            accepted pulse
//!   ┌──────┐ ─────────────▶ ┌─────────┐
//!   │ Idle │                │ Pending │ ── now < deadline ──┐
//!   └──────┘ ◀───────────── └─────────┘ ◀──────────────────┘
//!        try_claim + Notifier::flush
//! ```
//!
//! `tick` runs every dispatch tick from the main loop. The claim resets the
//! shared count before the blocking request starts, so pulses arriving during
//! the request accumulate into the next Pending cycle.

use log::{debug, info};

use crate::config::BoothConfig;
use crate::pulse::PulseAggregator;

use super::events::AppEvent;
use super::notifier::{FlushOutcome, Notifier};
use super::ports::{EventSink, HttpPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Pending,
}

/// Running totals since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub flushes: u32,
    pub delivered: u32,
    pub failed: u32,
    pub units_delivered: u64,
    pub units_dropped: u64,
}

pub struct Dispatcher {
    notifier: Notifier,
    state: DispatchState,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(config: &BoothConfig) -> Self {
        Self {
            notifier: Notifier::new(config.url.clone()),
            state: DispatchState::Idle,
            stats: DispatchStats::default(),
        }
    }

    /// One polling step. Returns the flush outcome when a flush happened.
    pub fn tick(
        &mut self,
        now_ms: u64,
        pulses: &PulseAggregator,
        http: &mut impl HttpPort,
        sink: &mut impl EventSink,
    ) -> Option<FlushOutcome> {
        let Some(amount) = pulses.try_claim(now_ms) else {
            self.observe(pulses, sink);
            return None;
        };
        let amount = amount.get();
        self.state = DispatchState::Idle;
        info!("Dispatcher: claimed {} pulses", amount);

        let outcome = self.notifier.flush(amount, http, sink);
        self.stats.flushes += 1;
        match outcome {
            FlushOutcome::Delivered { .. } => {
                self.stats.delivered += 1;
                self.stats.units_delivered += u64::from(amount);
            }
            FlushOutcome::Rejected { .. } | FlushOutcome::TransportFailed => {
                self.stats.failed += 1;
                self.stats.units_dropped += u64::from(amount);
            }
        }
        Some(outcome)
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Track Idle → Pending without claiming anything.
    fn observe(&mut self, pulses: &PulseAggregator, sink: &mut impl EventSink) {
        let snap = pulses.snapshot();
        match (self.state, snap.pending) {
            (DispatchState::Idle, n) if n > 0 => {
                self.state = DispatchState::Pending;
                debug!("Dispatcher: Idle -> Pending ({} pulses)", n);
                sink.emit(&AppEvent::PulsesPending {
                    pending: n,
                    flush_deadline_ms: snap.flush_deadline_ms,
                });
            }
            (DispatchState::Pending, 0) => self.state = DispatchState::Idle,
            _ => {}
        }
    }
}
