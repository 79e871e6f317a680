//! Blocking HTTP client adapter.
//!
//! Implements [`HttpPort`] for the notifier.
//!
//! - **`target_os = "espidf"`**: a fresh `EspHttpConnection` per request,
//!   [`HTTP_TIMEOUT_MS`] timeout, response body read up to
//!   [`RESPONSE_LOG_MAX_BYTES`] and the rest drained.
//! - **all other targets**: logs the URL and answers with a scripted status.

use log::debug;

use crate::app::ports::{HttpPort, HttpResponse, TransportError};
use crate::config::{HTTP_TIMEOUT_MS, RESPONSE_LOG_MAX_BYTES};

pub struct HttpClientAdapter {
    #[cfg(not(target_os = "espidf"))]
    sim_status: u16,
}

impl Default for HttpClientAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientAdapter {
    pub fn new() -> Self {
        debug!("HttpClient: timeout {}ms", HTTP_TIMEOUT_MS);
        Self {
            #[cfg(not(target_os = "espidf"))]
            sim_status: 200,
        }
    }

    /// Status the simulated server answers with.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_sim_status(status: u16) -> Self {
        Self { sim_status: status }
    }
}

/// Keep at most `max` bytes, cut back to a character boundary.
pub fn truncate_body(bytes: &[u8], max: usize) -> String {
    let text = String::from_utf8_lossy(&bytes[..bytes.len().min(max)]);
    let mut text = text.into_owned();
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

#[cfg(target_os = "espidf")]
impl HttpPort for HttpClientAdapter {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError> {
        use core::time::Duration;

        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
        use esp_idf_svc::sys::{ESP_ERR_HTTP_CONNECT, ESP_ERR_HTTP_EAGAIN};

        let classify = |e: esp_idf_svc::sys::EspError| {
            log::warn!("HttpClient: {}", e);
            let code = e.code();
            if code == ESP_ERR_HTTP_EAGAIN as i32 {
                TransportError::Timeout
            } else if code == ESP_ERR_HTTP_CONNECT as i32 {
                TransportError::ConnectFailed
            } else {
                TransportError::Io
            }
        };

        let mut conn = EspHttpConnection::new(&Configuration {
            timeout: Some(Duration::from_millis(HTTP_TIMEOUT_MS)),
            ..Default::default()
        })
        .map_err(|e| {
            log::warn!("HttpClient: init failed: {}", e);
            TransportError::InvalidRequest
        })?;

        conn.initiate_request(Method::Get, url, &[]).map_err(classify)?;
        conn.initiate_response().map_err(classify)?;
        let status = conn.status();

        let mut body = Vec::with_capacity(RESPONSE_LOG_MAX_BYTES);
        let mut buf = [0u8; 128];
        loop {
            let n = conn.read(&mut buf).map_err(classify)?;
            if n == 0 {
                break;
            }
            if body.len() < RESPONSE_LOG_MAX_BYTES {
                let take = n.min(RESPONSE_LOG_MAX_BYTES - body.len());
                body.extend_from_slice(&buf[..take]);
            }
        }

        debug!("HttpClient: GET {} -> {}", url, status);
        Ok(HttpResponse {
            status,
            body: truncate_body(&body, RESPONSE_LOG_MAX_BYTES),
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl HttpPort for HttpClientAdapter {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(TransportError::InvalidRequest);
        }
        log::info!("HttpClient(sim): GET {} -> {}", url, self.sim_status);
        Ok(HttpResponse {
            status: self.sim_status,
            body: String::new(),
        })
    }
}
