//! RP2040-specific HAL for the ice-melt firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `thawbox-hal` traits:
//!
//! - GPIO outputs and inputs (buzzer, indicator, reset button, trigger)
//! - Bit-banged 1-Wire master on a flex pin (temperature probes)
//! - Busy-wait echo pulse timer (ultrasonic probe)
//! - Buffered UART towards the WiFi co-processor
//! - Monotonic clock backed by the Embassy time driver
//! - Pin allocation by number for config-driven setup

#![no_std]

pub mod gpio;
pub mod onewire;
pub mod pins;
pub mod pulse;
pub mod time;
pub mod uart;

pub use gpio::{RpInput, RpOutput};
pub use onewire::FlexOneWire;
pub use pins::{PinBank, PinError, RemainingPeripherals};
pub use pulse::PulseInput;
pub use time::EmbassyClock;
pub use uart::ModemUart;

/// Core clock after `embassy_rp::init` with the default configuration
pub const SYS_CLOCK_MHZ: u32 = 125;

/// Busy-wait for `us` microseconds by counting core cycles
///
/// Safe to call with interrupts disabled, unlike the timer-based delays.
pub fn spin_us(us: u32) {
    cortex_m::asm::delay(us * SYS_CLOCK_MHZ);
}
