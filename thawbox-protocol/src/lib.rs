//! Thawbox uplink protocol
//!
//! This crate turns telemetry rows and completion notifications into
//! HTTP/1.1 requests that the modem driver writes onto a TCP or TLS link.
//! Nothing here touches hardware; every function is pure and runs on the
//! host.
//!
//! # Request Overview
//!
//! ```text
//! telemetry     POST /update HTTP/1.1          (plain TCP, port 80)
//!               Host / Connection / X-THINGSPEAKAPIKEY
//!               Content-Type: application/x-www-form-urlencoded
//!               field1=..&field2=..&..&field8=..
//!
//! notification  GET <path>?author=..&secretkey=..&message=.. HTTP/1.1
//!               Host / Connection                (TLS, port 443)
//! ```
//!
//! Requests are built with the typed [`Request`] builder. Query and form
//! values are percent-encoded on the way out by [`PercentEncoded`], so
//! callers never splice escaped strings by hand.

#![no_std]
#![deny(unsafe_code)]

pub mod encoding;
pub mod notification;
pub mod request;
pub mod telemetry;

pub use encoding::{encoded_len, percent_encode, PercentEncoded};
pub use notification::{Notification, NotificationEndpoint, MAX_MESSAGE_LEN};
pub use request::{EncodeError, Method, Request, MAX_HEADERS, MAX_QUERY_PARAMS, MAX_REQUEST_SIZE};
pub use telemetry::{TelemetryEndpoint, TelemetryRow, FIELD_COUNT, MAX_FORM_SIZE};
