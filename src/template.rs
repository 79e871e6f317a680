//! URL template with exactly one integer slot.
//!
//! The operator enters the target URL through the provisioning portal in
//! printf style, e.g. `http://photobooth.local/commands/increase-print?i=%d`.
//! Instead of handing that string to a formatter at flush time, the template
//! is parsed once when it is saved or loaded:
//!
//! - `%d`, `%i` and `%u` declare the integer slot (exactly one is required),
//! - `%%` is a literal percent sign,
//! - any other conversion (`%s`, `%5d`, a trailing `%`) is rejected.
//!
//! A [`UrlTemplate`] therefore always renders to a well-defined URL.

use core::fmt::{self, Write};

use serde::{Deserialize, Serialize};

/// Maximum template length accepted from the portal / NVS.
pub const URL_MAX_LEN: usize = 100;

/// Rendered URL capacity: template plus the widest `u32` (10 digits).
pub const RENDERED_MAX_LEN: usize = URL_MAX_LEN + 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateError {
    /// Template is empty.
    Empty,
    /// Template exceeds [`URL_MAX_LEN`] bytes.
    TooLong,
    /// No `%d` / `%i` / `%u` slot found.
    MissingSlot,
    /// More than one integer slot.
    MultipleSlots,
    /// A `%` followed by an unsupported conversion character.
    UnsupportedConversion(char),
    /// A lone `%` at the end of the template.
    DanglingPercent,
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "template is empty"),
            Self::TooLong => write!(f, "template longer than {} bytes", URL_MAX_LEN),
            Self::MissingSlot => write!(f, "template has no %d placeholder"),
            Self::MultipleSlots => write!(f, "template has more than one placeholder"),
            Self::UnsupportedConversion(c) => write!(f, "unsupported conversion '%{}'", c),
            Self::DanglingPercent => write!(f, "template ends with a lone '%'"),
        }
    }
}

/// A validated URL template holding a single integer slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UrlTemplate {
    raw: heapless::String<URL_MAX_LEN>,
    /// Byte offset of the `%` that opens the slot.
    slot: usize,
}

impl UrlTemplate {
    /// Parse and validate a printf-style template.
    pub fn parse(raw: &str) -> Result<Self, TemplateError> {
        if raw.is_empty() {
            return Err(TemplateError::Empty);
        }
        if raw.len() > URL_MAX_LEN {
            return Err(TemplateError::TooLong);
        }

        let mut slot = None;
        let mut chars = raw.char_indices();
        while let Some((idx, c)) = chars.next() {
            if c != '%' {
                continue;
            }
            match chars.next() {
                Some((_, '%')) => {}
                Some((_, 'd' | 'i' | 'u')) => {
                    if slot.replace(idx).is_some() {
                        return Err(TemplateError::MultipleSlots);
                    }
                }
                Some((_, other)) => return Err(TemplateError::UnsupportedConversion(other)),
                None => return Err(TemplateError::DanglingPercent),
            }
        }

        let slot = slot.ok_or(TemplateError::MissingSlot)?;
        let mut stored = heapless::String::new();
        stored.push_str(raw).map_err(|_| TemplateError::TooLong)?;
        Ok(Self { raw: stored, slot })
    }

    /// The template exactly as entered.
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }

    /// Substitute `amount` into the slot.
    pub fn render(&self, amount: u32) -> heapless::String<RENDERED_MAX_LEN> {
        let mut out = heapless::String::new();
        // Capacity covers the template plus ten digits, so writes cannot fail.
        let _ = push_unescaped(&mut out, &self.raw[..self.slot]);
        let _ = write!(out, "{}", amount);
        let _ = push_unescaped(&mut out, &self.raw[self.slot + 2..]);
        out
    }
}

impl Default for UrlTemplate {
    fn default() -> Self {
        let mut raw = heapless::String::new();
        let _ = raw.push_str(crate::config::DEFAULT_URL_TEMPLATE);
        Self {
            slot: crate::config::DEFAULT_URL_TEMPLATE.len() - 2,
            raw,
        }
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for UrlTemplate {
    type Error = TemplateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<UrlTemplate> for String {
    fn from(value: UrlTemplate) -> Self {
        value.as_str().into()
    }
}

/// Copy `segment` into `out`, collapsing `%%` to `%`.
fn push_unescaped<const N: usize>(out: &mut heapless::String<N>, segment: &str) -> fmt::Result {
    let mut pending_percent = false;
    for c in segment.chars() {
        if c == '%' && !pending_percent {
            pending_percent = true;
            continue;
        }
        pending_percent = false;
        out.push(c).map_err(|_| fmt::Error)?;
    }
    Ok(())
}
