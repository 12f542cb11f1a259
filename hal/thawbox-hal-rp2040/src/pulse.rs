//! Echo pulse timing by polling an input
//!
//! The RP2040 time driver ticks at 1 MHz, so `Instant` resolves single
//! microseconds; 1 µs of echo is about 0.17 mm of range.

use embassy_rp::gpio::{AnyPin, Input, Pull};
use embassy_rp::Peri;
use embassy_time::{Duration, Instant};
use thawbox_hal::{EchoTimer, PulseError};

/// Echo line of an ultrasonic range finder
pub struct PulseInput<'d> {
    pin: Input<'d>,
}

impl<'d> PulseInput<'d> {
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        Self {
            pin: Input::new(pin, Pull::Down),
        }
    }
}

impl EchoTimer for PulseInput<'_> {
    fn measure_high_pulse_us(&mut self, timeout_us: u32) -> Result<u32, PulseError> {
        let timeout = Duration::from_micros(timeout_us as u64);

        let waiting = Instant::now();
        while self.pin.is_low() {
            if waiting.elapsed() > timeout {
                return Err(PulseError::Timeout);
            }
        }

        let rise = Instant::now();
        while self.pin.is_high() {
            if rise.elapsed() > timeout {
                return Err(PulseError::Timeout);
            }
        }

        Ok(rise.elapsed().as_micros() as u32)
    }
}
