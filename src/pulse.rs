//! Debounced pulse aggregator shared between the GPIO ISR and the main loop.
//!
//! The coin acceptor emits one rising edge per credit. The ISR calls
//! [`PulseAggregator::on_pulse_edge`]; the dispatcher polls
//! [`PulseAggregator::try_claim`] from the main loop.
//!
//! ```text
//!  GPIO ISR ──▶ on_pulse_edge ──▶ ┌──────────────────────┐
//!                                 │ pending              │
//!                                 │ flush_deadline_ms    │ ◀── try_claim ◀── Dispatcher
//!                                 │ debounce_guard_ms    │
//!                                 │ quiet_period_ms      │
//!                                 └──────────────────────┘
//! ```
//!
//! All four fields live in a single [`Cell`] behind an
//! [`IsrMutex`](crate::isr_lock::IsrMutex), whose lock masks interrupts.
//! Every operation is one such section, so the ISR can never observe or
//! produce a half-written block, and the claim-then-reset in `try_claim`
//! cannot race with an increment.

use core::cell::Cell;
use core::num::NonZeroU32;

use crate::config::DEBOUNCE_WINDOW_MS;
use crate::isr_lock::IsrMutex;

/// Plain copy of the shared block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PulseSnapshot {
    /// Pulses accepted since the last claim.
    pub pending: u32,
    /// Earliest time a nonzero `pending` may be flushed.
    pub flush_deadline_ms: u64,
    /// Earliest time a new edge is accepted.
    pub debounce_guard_ms: u64,
    /// Quiet period applied to the next accepted pulse.
    pub quiet_period_ms: u32,
}

/// Interrupt-safe pulse counter with debounce and flush deadline.
pub struct PulseAggregator {
    state: IsrMutex<Cell<PulseSnapshot>>,
}

impl PulseAggregator {
    pub const fn new(quiet_period_ms: u32) -> Self {
        Self {
            state: IsrMutex::new(Cell::new(PulseSnapshot {
                pending: 0,
                flush_deadline_ms: 0,
                debounce_guard_ms: 0,
                quiet_period_ms,
            })),
        }
    }

    /// Set the quiet period used for subsequently accepted pulses.
    pub fn configure(&self, quiet_period_ms: u32) {
        self.update(|s| s.quiet_period_ms = quiet_period_ms);
    }

    /// Register a rising edge observed at `now_ms`.
    ///
    /// Returns `false` when the edge falls inside the debounce window and was
    /// discarded. Safe to call from ISR context: no allocation, no logging.
    pub fn on_pulse_edge(&self, now_ms: u64) -> bool {
        self.update(|s| {
            if now_ms < s.debounce_guard_ms {
                return false;
            }
            s.pending = s.pending.saturating_add(1);
            s.flush_deadline_ms = now_ms + u64::from(s.quiet_period_ms);
            s.debounce_guard_ms = now_ms + DEBOUNCE_WINDOW_MS;
            true
        })
    }

    /// Claim the pending count if the quiet period has elapsed.
    ///
    /// The count is reset to zero in the same interrupt-free section that reads it.
    pub fn try_claim(&self, now_ms: u64) -> Option<NonZeroU32> {
        self.update(|s| {
            let amount = NonZeroU32::new(s.pending)?;
            if now_ms < s.flush_deadline_ms {
                return None;
            }
            s.pending = 0;
            Some(amount)
        })
    }

    /// Pulses accepted since the last claim.
    pub fn pending(&self) -> u32 {
        self.snapshot().pending
    }

    /// Consistent copy of the whole block.
    pub fn snapshot(&self) -> PulseSnapshot {
        self.state.lock(Cell::get)
    }

    fn update<R>(&self, f: impl FnOnce(&mut PulseSnapshot) -> R) -> R {
        self.state.lock(|cell| {
            let mut s = cell.get();
            let result = f(&mut s);
            cell.set(s);
            result
        })
    }
}
