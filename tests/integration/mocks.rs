//! Mock adapters for integration tests.
//!
//! Each mock records what the domain asked of it so tests can assert on
//! the full call history without WiFi, NVS or a network.

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};

use coinbooth::app::events::AppEvent;
use coinbooth::app::ports::{
    Clock, ConfigStore, EventSink, FieldValue, HttpPort, HttpResponse, PortalField,
    ProvisioningError, ProvisioningPort, ReprovisionButton, StorageError, TransportError,
};

// ── Config store ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stored {
    Str(String),
    I32(i32),
}

#[derive(Default)]
pub struct MemStore {
    pub values: HashMap<String, Stored>,
    pub writes: u32,
    /// Every write fails with `StorageError::Full`.
    pub full: bool,
}

impl ConfigStore for MemStore {
    fn get_str(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.values.get(key) {
            Some(Stored::Str(s)) => Ok(Some(s.clone())),
            Some(Stored::I32(_)) => Err(StorageError::TypeMismatch),
            None => Ok(None),
        }
    }

    fn put_str(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.full {
            return Err(StorageError::Full);
        }
        self.writes += 1;
        self.values.insert(key.into(), Stored::Str(value.into()));
        Ok(())
    }

    fn get_i32(&self, key: &str) -> Result<Option<i32>, StorageError> {
        match self.values.get(key) {
            Some(Stored::I32(v)) => Ok(Some(*v)),
            Some(Stored::Str(_)) => Err(StorageError::TypeMismatch),
            None => Ok(None),
        }
    }

    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        if self.full {
            return Err(StorageError::Full);
        }
        self.writes += 1;
        self.values.insert(key.into(), Stored::I32(value));
        Ok(())
    }
}

// ── Provisioning portal ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PortalCall {
    pub manual: bool,
    pub ap_name: String,
    pub fields: Vec<PortalField>,
}

pub struct ScriptedPortal {
    pub auto_reply: Result<Vec<FieldValue>, ProvisioningError>,
    pub manual_reply: Result<Vec<FieldValue>, ProvisioningError>,
    pub connected: bool,
    pub calls: Vec<PortalCall>,
}

#[allow(dead_code)]
impl ScriptedPortal {
    /// Autoconnect succeeds with no edits; station stays connected.
    pub fn online() -> Self {
        Self {
            auto_reply: Ok(Vec::new()),
            manual_reply: Ok(Vec::new()),
            connected: true,
            calls: Vec::new(),
        }
    }

    pub fn manual_calls(&self) -> usize {
        self.calls.iter().filter(|c| c.manual).count()
    }
}

impl ProvisioningPort for ScriptedPortal {
    fn auto_connect(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
    ) -> Result<Vec<FieldValue>, ProvisioningError> {
        self.calls.push(PortalCall {
            manual: false,
            ap_name: ap_name.into(),
            fields: fields.to_vec(),
        });
        self.auto_reply.clone()
    }

    fn start_portal(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
    ) -> Result<Vec<FieldValue>, ProvisioningError> {
        self.calls.push(PortalCall {
            manual: true,
            ap_name: ap_name.into(),
            fields: fields.to_vec(),
        });
        self.manual_reply.clone()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ── Clock ─────────────────────────────────────────────────────

/// Clock that only moves when slept on.
#[derive(Default)]
pub struct FakeClock {
    now: Cell<u64>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn at(ms: u64) -> Self {
        Self { now: Cell::new(ms) }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.advance(ms);
    }
}

// ── Button ────────────────────────────────────────────────────

/// Reads as pressed from poll number `press_on_poll` onwards.
#[derive(Default)]
pub struct ScriptedButton {
    pub press_on_poll: Option<u32>,
    pub polls: u32,
}

impl ReprovisionButton for ScriptedButton {
    fn is_pressed(&mut self) -> bool {
        self.polls += 1;
        self.press_on_poll.is_some_and(|n| self.polls >= n)
    }
}

// ── HTTP ──────────────────────────────────────────────────────

/// Records requested URLs; replies from a queue, then 200.
#[derive(Default)]
pub struct MockHttp<'a> {
    pub urls: Vec<String>,
    pub replies: VecDeque<Result<HttpResponse, TransportError>>,
    /// Runs while the request is "in flight".
    pub during_request: Option<Box<dyn FnMut() + 'a>>,
}

#[allow(dead_code)]
impl<'a> MockHttp<'a> {
    pub fn replying(status: u16) -> Self {
        let mut http = Self::default();
        http.replies.push_back(Ok(HttpResponse {
            status,
            body: String::new(),
        }));
        http
    }
}

impl HttpPort for MockHttp<'_> {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError> {
        self.urls.push(url.into());
        if let Some(hook) = self.during_request.as_mut() {
            hook();
        }
        self.replies.pop_front().unwrap_or(Ok(HttpResponse {
            status: 200,
            body: "OK".into(),
        }))
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
