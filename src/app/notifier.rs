//! Notifier: sends one claimed amount to the remote print-limit endpoint.
//!
//! Fire-and-forget: each flush issues exactly one GET. A non-2xx status or a
//! transport error is logged and the amount is dropped; nothing is requeued.

use log::{info, warn};

use crate::template::UrlTemplate;

use super::events::AppEvent;
use super::ports::{EventSink, HttpPort};

/// Result of a single flush, for counters and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Delivered { status: u16 },
    Rejected { status: u16 },
    TransportFailed,
}

pub struct Notifier {
    url: UrlTemplate,
}

impl Notifier {
    pub fn new(url: UrlTemplate) -> Self {
        Self { url }
    }

    /// Render the URL for `amount`, send it, and report what happened.
    pub fn flush(
        &self,
        amount: u32,
        http: &mut impl HttpPort,
        sink: &mut impl EventSink,
    ) -> FlushOutcome {
        let url = self.url.render(amount);
        info!("Notifier: trying request {}", url);
        sink.emit(&AppEvent::FlushStarted {
            amount,
            url: url.as_str().into(),
        });

        match http.get(&url) {
            Ok(resp) if resp.is_success() => {
                sink.emit(&AppEvent::FlushDelivered {
                    amount,
                    status: resp.status,
                    body: resp.body,
                });
                FlushOutcome::Delivered {
                    status: resp.status,
                }
            }
            Ok(resp) => {
                warn!("Notifier: {} pulses dropped, HTTP {}", amount, resp.status);
                sink.emit(&AppEvent::FlushRejected {
                    amount,
                    status: resp.status,
                });
                FlushOutcome::Rejected {
                    status: resp.status,
                }
            }
            Err(e) => {
                warn!("Notifier: {} pulses dropped, GET failed: {}", amount, e);
                sink.emit(&AppEvent::FlushTransportFailed {
                    amount,
                    reason: e.to_string(),
                });
                FlushOutcome::TransportFailed
            }
        }
    }
}
