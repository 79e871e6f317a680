//! Outbound application events.
//!
//! The dispatcher, notifier and boot flow emit these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them (serial log in production, a recording
//! vector in tests).

use crate::config::BoothConfig;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Idle → Pending: pulses arrived and wait for the quiet period.
    PulsesPending { pending: u32, flush_deadline_ms: u64 },

    /// The pending count was claimed and a request is about to be sent.
    FlushStarted { amount: u32, url: String },

    /// The remote system accepted the increment.
    FlushDelivered { amount: u32, status: u16, body: String },

    /// The remote system answered with a non-success status. Not retried.
    FlushRejected { amount: u32, status: u16 },

    /// The request never produced a response. Not retried.
    FlushTransportFailed { amount: u32, reason: String },

    /// Configuration loaded from the store.
    ConfigLoaded(BoothConfig),

    /// A provisioning submission was written to the store.
    ConfigSaved { url: String, quiet_period_ms: u32 },

    /// A submitted field was rejected and the stored value kept.
    ConfigFieldRejected { id: String, reason: String },

    /// Boot milestones (autoconnect, manual portal, ready).
    Boot(BootStage),
}

/// Milestones of the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStage {
    AutoConnecting,
    AutoConnectFailed,
    WaitingForReprovision,
    ManualPortalOpened,
    ManualPortalFailed,
    ConnectivityLost,
    Ready,
}
