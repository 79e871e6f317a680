//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements       | Connects to                     |
//! |---------------|------------------|---------------------------------|
//! | `http`        | HttpPort         | ESP-IDF HTTP client             |
//! | `log_sink`    | EventSink        | Serial log output               |
//! | `nvs`         | ConfigStore      | NVS / in-memory store           |
//! | `portal_form` | (helpers)        | Portal HTML and form decoding   |
//! | `system`      | (free functions) | Restart / halt                  |
//! | `time`        | Clock            | ESP32 system timer              |
//! | `wifi`        | ProvisioningPort | ESP-IDF WiFi STA + soft-AP      |

pub mod http;
pub mod log_sink;
pub mod nvs;
pub mod portal_form;
pub mod system;
pub mod time;
pub mod wifi;
