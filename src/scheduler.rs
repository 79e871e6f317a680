//! Fixed-period tick engine for the main loop.
//!
//! ```text
//!   ┌──────────────┐   wait()   ┌───────────────────┐
//!   │ Ticker (10ms)│ ─────────▶ │ Dispatcher::tick  │
//!   └──────┬───────┘            └───────────────────┘
//!          │ every HEARTBEAT_TICKS
//!          ▼
//!   heartbeat: feed watchdog, log counters
//! ```
//!
//! The ticker sleeps until the next period boundary instead of spinning.
//! When a tick overruns (a flush blocked on the network), the missed
//! boundaries are skipped rather than replayed back to back: the dispatcher
//! only needs "at least once per period", not a tick count.

use log::debug;

use crate::app::ports::Clock;

pub struct Ticker {
    period_ms: u64,
    next_ms: u64,
    heartbeat_every: u32,
    ticks: u32,
    skipped: u64,
}

/// What a completed [`Ticker::wait`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Monotonic time at which the tick fired.
    pub now_ms: u64,
    /// True once every `heartbeat_every` ticks.
    pub heartbeat: bool,
}

impl Ticker {
    /// First tick fires one period after `start_ms`.
    pub fn new(period_ms: u64, heartbeat_every: u32, start_ms: u64) -> Self {
        let period_ms = period_ms.max(1);
        Self {
            period_ms,
            next_ms: start_ms + period_ms,
            heartbeat_every: heartbeat_every.max(1),
            ticks: 0,
            skipped: 0,
        }
    }

    /// Block until the next boundary and advance.
    pub fn wait(&mut self, clock: &impl Clock) -> Tick {
        let now = clock.now_ms();
        if now < self.next_ms {
            clock.sleep_ms(self.next_ms - now);
        }
        // The delay may wake a little before the boundary; report the real
        // time so deadlines are never judged against a rounded-up clock.
        self.advance(clock.now_ms())
    }

    /// Account a tick observed at `now_ms` and schedule the next boundary.
    pub fn advance(&mut self, now_ms: u64) -> Tick {
        let (next, missed) = next_after(self.next_ms, self.period_ms, now_ms);
        if missed > 0 {
            self.skipped += missed;
            debug!("Ticker: overran by {} ticks", missed);
        }
        self.next_ms = next;

        self.ticks += 1;
        let heartbeat = self.ticks >= self.heartbeat_every;
        if heartbeat {
            self.ticks = 0;
        }
        Tick { now_ms, heartbeat }
    }

    /// Boundary the next `wait` sleeps until.
    pub fn next_ms(&self) -> u64 {
        self.next_ms
    }

    /// Boundaries skipped because a tick overran.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

/// First boundary strictly after `now_ms`, given the boundary `due_ms` that
/// just fired, plus the number of boundaries in between that were missed.
pub fn next_after(due_ms: u64, period_ms: u64, now_ms: u64) -> (u64, u64) {
    if now_ms < due_ms + period_ms {
        return (due_ms + period_ms, 0);
    }
    let behind = (now_ms - due_ms) / period_ms;
    (due_ms + (behind + 1) * period_ms, behind)
}
