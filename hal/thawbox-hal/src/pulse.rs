//! Echo pulse timing
//!
//! Ultrasonic range finders report distance as the width of a high pulse
//! on their echo line.

/// Errors from pulse measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseError {
    /// No complete pulse arrived before the timeout
    Timeout,
}

/// Measures the width of the next high pulse on an input line
pub trait EchoTimer {
    /// Wait for a rising edge, then time the pulse until the falling edge
    ///
    /// Both the wait and the pulse itself are bounded by `timeout_us`.
    /// Returns the pulse width in microseconds.
    fn measure_high_pulse_us(&mut self, timeout_us: u32) -> Result<u32, PulseError>;
}
