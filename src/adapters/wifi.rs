//! WiFi station adapter with a soft-AP configuration portal.
//!
//! Implements [`ProvisioningPort`]. Station credentials are kept in their
//! own NVS namespace ([`WIFI_NVS_NAMESPACE`]); the booth settings travel
//! through the portal as [`FieldValue`]s and are persisted by the caller.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` for the station,
//!   mixed AP+STA mode plus an `EspHttpServer` for the portal.
//! - **all other targets**: a scripted network for host-side tests.
//!
//! ## Portal loop
//!
//! ```text
//!   open AP ──▶ serve form ──▶ submission ──▶ try station connect
//!      ▲                                          │ fail
//!      └──────────── notice "could not connect" ◀─┘
//! ```
//!
//! The loop ends on a successful connect. The first-boot portal has no
//! deadline; the manual portal gives up after [`PORTAL_TIMEOUT_MS`]. A portal
//! that fails takes the soft-AP down with it.

use log::{error, info, warn};

use crate::adapters::nvs::NvsAdapter;
use crate::adapters::portal_form::PortalSubmission;
use crate::adapters::time::uptime_ms;
use crate::app::ports::{ConfigStore, FieldValue, PortalField, ProvisioningError, ProvisioningPort};
use crate::config::{PORTAL_TIMEOUT_MS, WIFI_CONNECT_RETRIES, WIFI_NVS_NAMESPACE};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{
        AccessPointConfiguration, AuthMethod, BlockingWifi, ClientConfiguration, Configuration,
        EspWifi,
    },
};

const SSID_KEY: &str = "ssid";
const PASSWORD_KEY: &str = "pass";

// ───────────────────────────────────────────────────────────────
// Connection state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    PortalOpen,
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn valid_ssid(ssid: &str) -> bool {
    !ssid.is_empty() && ssid.len() <= 32 && is_printable_ascii(ssid)
}

fn valid_password(password: &str) -> bool {
    password.is_empty() || (8..=64).contains(&password.len())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    state: WifiState,
    creds: NvsAdapter,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimNetwork,
}

/// Scripted network for host runs.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
pub struct SimNetwork {
    /// SSID the simulated AP accepts; `None` means no network in range.
    pub reachable_ssid: Option<String>,
    /// Submissions the simulated operator makes, one per portal round.
    /// Once exhausted, the next round fails as if the portal timed out.
    pub portal_replies: std::collections::VecDeque<PortalSubmission>,
    /// Portal rounds served so far.
    pub portals_opened: u32,
    /// Soft-AP currently advertised.
    pub ap_up: bool,
    /// Deadline handed to the most recent portal round.
    pub last_portal_timeout_ms: Option<u64>,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
    ) -> anyhow::Result<Self> {
        let creds = NvsAdapter::open(nvs.clone(), WIFI_NVS_NAMESPACE)?;
        let wifi = BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), Some(nvs))?, sysloop)?;
        info!("WiFi: driver created");
        Ok(Self {
            state: WifiState::Disconnected,
            creds,
            wifi,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(sim: SimNetwork) -> Result<Self, crate::app::ports::StorageError> {
        Ok(Self {
            state: WifiState::Disconnected,
            creds: NvsAdapter::open(WIFI_NVS_NAMESPACE)?,
            sim,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    /// Simulated network, for inspection in tests.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim(&mut self) -> &mut SimNetwork {
        &mut self.sim
    }

    /// Store station credentials for the next autoconnect.
    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ProvisioningError> {
        if !valid_ssid(ssid) || !valid_password(password) {
            warn!("WiFi: rejected credentials for '{}'", ssid);
            return Err(ProvisioningError::ConnectFailed);
        }
        self.creds
            .put_str(SSID_KEY, ssid)
            .and_then(|()| self.creds.put_str(PASSWORD_KEY, password))
            .map_err(|e| {
                error!("WiFi: storing credentials failed: {}", e);
                ProvisioningError::DriverFailed
            })?;
        info!("WiFi: credentials updated (SSID='{}')", ssid);
        Ok(())
    }

    fn stored_credentials(&self) -> Option<(String, String)> {
        let ssid = self.creds.get_str(SSID_KEY).ok().flatten()?;
        let password = self.creds.get_str_or(PASSWORD_KEY, "").unwrap_or_default();
        Some((ssid, password))
    }

    fn connect_with_retries(&mut self, ssid: &str, password: &str) -> bool {
        for attempt in 1..=WIFI_CONNECT_RETRIES {
            info!("WiFi: connecting to '{}' (attempt {})", ssid, attempt);
            match self.platform_connect(ssid, password) {
                Ok(()) => {
                    self.state = WifiState::Connected;
                    info!("WiFi: connected to '{}'", ssid);
                    return true;
                }
                Err(e) => warn!("WiFi: attempt {} failed: {}", attempt, e),
            }
        }
        self.state = WifiState::Disconnected;
        false
    }

    /// Serve the portal until a submission yields a working station link.
    ///
    /// `timeout_ms = None` keeps the portal open until someone configures
    /// the booth. On any failure the soft-AP is taken down before returning.
    fn run_portal(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
        timeout_ms: Option<u64>,
    ) -> Result<Vec<FieldValue>, ProvisioningError> {
        let result = self.serve_portal(ap_name, fields, timeout_ms);
        if result.is_err() {
            self.close_portal();
        }
        result
    }

    fn serve_portal(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
        timeout_ms: Option<u64>,
    ) -> Result<Vec<FieldValue>, ProvisioningError> {
        let deadline = timeout_ms.map(|t| uptime_ms() + t);
        let mut notice: Option<String> = None;

        loop {
            let remaining = match deadline {
                Some(deadline) => match deadline.saturating_sub(uptime_ms()) {
                    0 => {
                        warn!("WiFi: portal '{}' timed out", ap_name);
                        return Err(ProvisioningError::PortalTimeout);
                    }
                    ms => Some(ms),
                },
                None => None,
            };

            info!("WiFi: portal '{}' open", ap_name);
            self.state = WifiState::PortalOpen;
            let submission = self.platform_portal(ap_name, fields, notice.as_deref(), remaining)?;

            if !valid_ssid(&submission.ssid) || !valid_password(&submission.password) {
                notice = Some("Invalid SSID or password".into());
                continue;
            }
            if self.connect_with_retries(&submission.ssid, &submission.password) {
                self.set_credentials(&submission.ssid, &submission.password)?;
                return Ok(submission.fields);
            }
            notice = Some(format!("Could not connect to '{}'", submission.ssid));
        }
    }

    fn close_portal(&mut self) {
        self.state = WifiState::Disconnected;
        self.platform_close_portal();
        info!("WiFi: portal closed, soft-AP down");
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_connect(&mut self, ssid: &str, password: &str) -> anyhow::Result<()> {
        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: ssid
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("SSID too long"))?,
                password: password
                    .try_into()
                    .map_err(|_| anyhow::anyhow!("password too long"))?,
                auth_method,
                ..Default::default()
            }))?;
        if !self.wifi.is_started()? {
            self.wifi.start()?;
        }
        self.wifi.connect()?;
        self.wifi.wait_netif_up()?;
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_connect(&mut self, ssid: &str, _password: &str) -> Result<(), ProvisioningError> {
        match &self.sim.reachable_ssid {
            Some(reachable) if reachable == ssid => Ok(()),
            _ => Err(ProvisioningError::ConnectFailed),
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_portal(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
        notice: Option<&str>,
        timeout_ms: Option<u64>,
    ) -> Result<PortalSubmission, ProvisioningError> {
        use std::sync::{Arc, Mutex};

        use esp_idf_svc::http::Method;
        use esp_idf_svc::io::{Read, Write};
        use esp_idf_svc::http::server::{Configuration as HttpConfig, EspHttpServer};

        use crate::adapters::portal_form::{parse_form, render_form};

        const BODY_MAX: usize = 2048;

        let ap = AccessPointConfiguration {
            ssid: ap_name
                .try_into()
                .map_err(|_| ProvisioningError::DriverFailed)?,
            auth_method: AuthMethod::None,
            channel: 1,
            ..Default::default()
        };
        let driver = |e: esp_idf_svc::sys::EspError| {
            error!("WiFi: portal driver error: {}", e);
            ProvisioningError::DriverFailed
        };
        let _ = self.wifi.disconnect();
        self.wifi
            .set_configuration(&Configuration::Mixed(ClientConfiguration::default(), ap))
            .map_err(driver)?;
        if !self.wifi.is_started().map_err(driver)? {
            self.wifi.start().map_err(driver)?;
        }

        let page = render_form(ap_name, fields, notice);
        let title = ap_name.to_string();
        let submitted: Arc<Mutex<Option<PortalSubmission>>> = Arc::new(Mutex::new(None));

        let mut server = EspHttpServer::new(&HttpConfig::default()).map_err(driver)?;
        server
            .fn_handler::<anyhow::Error, _>("/", Method::Get, move |req| {
                req.into_ok_response()?.write_all(page.as_bytes())?;
                Ok(())
            })
            .map_err(driver)?;

        let slot = submitted.clone();
        let field_list: Vec<PortalField> = fields.to_vec();
        server
            .fn_handler::<anyhow::Error, _>("/save", Method::Post, move |mut req| {
                let mut body = Vec::new();
                let mut buf = [0u8; 256];
                loop {
                    let n = req.read(&mut buf)?;
                    if n == 0 || body.len() + n > BODY_MAX {
                        break;
                    }
                    body.extend_from_slice(&buf[..n]);
                }
                match parse_form(&String::from_utf8_lossy(&body)) {
                    Ok(sub) => {
                        if let Ok(mut slot) = slot.lock() {
                            *slot = Some(sub);
                        }
                        req.into_ok_response()?
                            .write_all(b"<html><body>Saved. Connecting...</body></html>")?;
                    }
                    Err(e) => {
                        let page = render_form(&title, &field_list, Some(&e.to_string()));
                        req.into_status_response(400)?.write_all(page.as_bytes())?;
                    }
                }
                Ok(())
            })
            .map_err(driver)?;

        let deadline = timeout_ms.map(|t| uptime_ms() + t);
        while deadline.is_none_or(|d| uptime_ms() < d) {
            if let Some(sub) = submitted.lock().ok().and_then(|mut s| s.take()) {
                info!("WiFi: portal submission for SSID '{}'", sub.ssid);
                // Give the browser the confirmation page before the AP goes down.
                std::thread::sleep(std::time::Duration::from_millis(500));
                return Ok(sub);
            }
            std::thread::sleep(std::time::Duration::from_millis(100));
        }
        Err(ProvisioningError::PortalTimeout)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_portal(
        &mut self,
        ap_name: &str,
        _fields: &[PortalField],
        notice: Option<&str>,
        timeout_ms: Option<u64>,
    ) -> Result<PortalSubmission, ProvisioningError> {
        self.sim.portals_opened += 1;
        self.sim.ap_up = true;
        self.sim.last_portal_timeout_ms = timeout_ms;
        if let Some(notice) = notice {
            info!("WiFi(sim): portal '{}' notice: {}", ap_name, notice);
        }
        self.sim
            .portal_replies
            .pop_front()
            .ok_or(ProvisioningError::PortalTimeout)
    }

    #[cfg(target_os = "espidf")]
    fn platform_close_portal(&mut self) {
        if let Err(e) = self.wifi.stop() {
            warn!("WiFi: stopping soft-AP failed: {}", e);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_close_portal(&mut self) {
        self.sim.ap_up = false;
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        self.state == WifiState::Connected
    }
}

// ───────────────────────────────────────────────────────────────
// ProvisioningPort
// ───────────────────────────────────────────────────────────────

impl ProvisioningPort for WifiAdapter {
    fn auto_connect(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
    ) -> Result<Vec<FieldValue>, ProvisioningError> {
        if let Some((ssid, password)) = self.stored_credentials() {
            if self.connect_with_retries(&ssid, &password) {
                return Ok(fields
                    .iter()
                    .map(|f| FieldValue::new(f.id, &f.value))
                    .collect());
            }
            warn!("WiFi: stored network '{}' unreachable, opening portal", ssid);
        } else {
            info!("WiFi: no stored credentials, opening portal");
        }
        // First boot: wait for the operator however long it takes.
        self.run_portal(ap_name, fields, None)
    }

    fn start_portal(
        &mut self,
        ap_name: &str,
        fields: &[PortalField],
    ) -> Result<Vec<FieldValue>, ProvisioningError> {
        self.run_portal(ap_name, fields, Some(PORTAL_TIMEOUT_MS))
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
