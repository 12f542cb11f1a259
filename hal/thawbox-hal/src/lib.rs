//! Thawbox Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that chip-specific HALs
//! implement. Drivers in `thawbox-drivers` are written against these traits
//! only, so every driver can be exercised on the host with mock pins.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (thawbox-firmware)         │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  thawbox-drivers (DS18B20, HC-SR04, …)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  thawbox-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ thawbox-hal-  │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial link to the WiFi co-processor
//! - [`onewire::OneWireBus`] - Dallas 1-Wire bus (temperature probes)
//! - [`pulse::EchoTimer`] - Echo pulse width measurement (ultrasonic probe)
//! - [`time::Clock`] - Monotonic millisecond clock

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod onewire;
pub mod pulse;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use onewire::{OneWireBus, OneWireError};
pub use pulse::{EchoTimer, PulseError};
pub use time::Clock;
pub use uart::{UartRx, UartTx};
