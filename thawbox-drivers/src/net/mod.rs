//! WiFi uplink
//!
//! [`esp_at`] talks to an ESP32/ESP8266 running the stock AT firmware;
//! [`uplink`] layers HTTP requests from `thawbox-protocol` on top of it.

pub mod esp_at;
pub mod uplink;

pub use esp_at::{Drain, EspAtModem, Link, Modem, ModemError, ModemTiming, Response};
pub use uplink::HttpUplink;
