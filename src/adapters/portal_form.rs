//! Captive portal page: HTML rendering and form decoding.
//!
//! Pure functions so the page and the decoder are tested on the host; the
//! WiFi adapter serves [`render_form`] on `GET /` and feeds the `POST /save`
//! body through [`parse_form`].

use core::fmt::Write;

use crate::app::ports::{FieldValue, PortalField};
use crate::config::PORTAL_FIELD_MAX_LEN;

/// Form field carrying the station SSID.
pub const SSID_FIELD: &str = "ssid";
/// Form field carrying the station passphrase.
pub const PASSWORD_FIELD: &str = "password";

/// Longest SSID 802.11 allows.
const SSID_MAX_LEN: usize = 32;
/// Longest WPA2 passphrase.
const PASSWORD_MAX_LEN: usize = 64;

/// Decoded portal submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSubmission {
    pub ssid: String,
    pub password: String,
    /// Every other field, in submission order.
    pub fields: Vec<FieldValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    MissingSsid,
    SsidTooLong,
    PasswordTooLong,
}

impl core::fmt::Display for FormError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingSsid => write!(f, "SSID is required"),
            Self::SsidTooLong => write!(f, "SSID longer than {} bytes", SSID_MAX_LEN),
            Self::PasswordTooLong => {
                write!(f, "password longer than {} bytes", PASSWORD_MAX_LEN)
            }
        }
    }
}

impl std::error::Error for FormError {}

/// Render the configuration page for the access point `title`.
///
/// `notice` is shown above the form (e.g. the error of a previous attempt).
pub fn render_form(title: &str, fields: &[PortalField], notice: Option<&str>) -> String {
    let mut html = String::with_capacity(2048);
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
         <title>{t}</title></head><body><h1>{t}</h1>",
        t = escape_html(title)
    );
    if let Some(notice) = notice {
        let _ = write!(html, "<p><b>{}</b></p>", escape_html(notice));
    }
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/save\">\
         <label for=\"{s}\">SSID</label><br>\
         <input id=\"{s}\" name=\"{s}\" maxlength=\"{sl}\" required><br>\
         <label for=\"{p}\">Password</label><br>\
         <input id=\"{p}\" name=\"{p}\" type=\"password\" maxlength=\"{pl}\"><br>",
        s = SSID_FIELD,
        sl = SSID_MAX_LEN,
        p = PASSWORD_FIELD,
        pl = PASSWORD_MAX_LEN,
    );
    for field in fields {
        let _ = write!(
            html,
            "<label for=\"{id}\">{label}</label><br>\
             <input id=\"{id}\" name=\"{id}\" maxlength=\"{max}\" value=\"{value}\"><br>",
            id = escape_html(field.id),
            label = escape_html(field.label),
            max = PORTAL_FIELD_MAX_LEN,
            value = escape_html(&field.value),
        );
    }
    html.push_str("<button type=\"submit\">Save</button></form></body></html>");
    html
}

/// Decode an `application/x-www-form-urlencoded` body.
pub fn parse_form(body: &str) -> Result<PortalSubmission, FormError> {
    let mut ssid = None;
    let mut password = String::new();
    let mut fields = Vec::new();

    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = url_decode(raw_key);
        let value = url_decode(raw_value);
        match key.as_str() {
            SSID_FIELD => ssid = Some(value),
            PASSWORD_FIELD => password = value,
            _ => fields.push(FieldValue {
                id: key,
                value: truncate_chars(value, PORTAL_FIELD_MAX_LEN),
            }),
        }
    }

    let ssid = ssid
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(FormError::MissingSsid)?;
    if ssid.len() > SSID_MAX_LEN {
        return Err(FormError::SsidTooLong);
    }
    if password.len() > PASSWORD_MAX_LEN {
        return Err(FormError::PasswordTooLong);
    }

    Ok(PortalSubmission {
        ssid,
        password,
        fields,
    })
}

/// Percent-decoding with `+` as space. Malformed escapes pass through.
pub fn url_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}
