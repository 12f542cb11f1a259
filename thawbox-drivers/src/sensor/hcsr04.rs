//! HC-SR04 ultrasonic range finder
//!
//! A 10 µs trigger pulse starts a ping; the echo line then stays high for
//! the sound's round trip. At room temperature that is 58 µs per
//! centimetre of distance.

use embedded_hal::delay::DelayNs;
use thawbox_core::traits::{DistanceSensor, SensorError};
use thawbox_hal::{EchoTimer, OutputPin, PulseError};

/// Echo microseconds per centimetre of distance
pub const ECHO_US_PER_CM: f32 = 58.0;

/// Settle time with the trigger low before a ping
const TRIGGER_SETTLE_US: u32 = 2;

/// Trigger pulse width
const TRIGGER_PULSE_US: u32 = 10;

/// Default echo timeout (about 4 m)
pub const DEFAULT_TIMEOUT_US: u32 = 25_000;

/// Convert an echo pulse width to metres
pub fn echo_to_metres(echo_us: u32) -> f32 {
    echo_us as f32 / ECHO_US_PER_CM / 100.0
}

/// HC-SR04 on a trigger output and an echo timer
pub struct HcSr04<T, E, D> {
    trigger: T,
    echo: E,
    delay: D,
    timeout_us: u32,
}

impl<T: OutputPin, E: EchoTimer, D: DelayNs> HcSr04<T, E, D> {
    /// Create a range finder; the trigger is driven low immediately
    pub fn new(mut trigger: T, echo: E, delay: D, timeout_us: u32) -> Self {
        trigger.set_low();
        Self {
            trigger,
            echo,
            delay,
            timeout_us,
        }
    }

    /// Fire one ping and return the echo width in microseconds
    pub fn ping_us(&mut self) -> Result<u32, SensorError> {
        self.trigger.set_low();
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.trigger.set_high();
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low();

        match self.echo.measure_high_pulse_us(self.timeout_us) {
            Ok(0) | Err(PulseError::Timeout) => Err(SensorError::Timeout),
            Ok(us) => Ok(us),
        }
    }
}

impl<T: OutputPin, E: EchoTimer, D: DelayNs> DistanceSensor for HcSr04<T, E, D> {
    fn read_distance_m(&mut self) -> Result<f32, SensorError> {
        self.ping_us().map(echo_to_metres)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct MockTrigger {
        high: bool,
        edges: Vec<bool>,
    }

    impl OutputPin for MockTrigger {
        fn set_high(&mut self) {
            self.high = true;
            self.edges.push(true);
        }

        fn set_low(&mut self) {
            self.high = false;
            self.edges.push(false);
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    struct MockEcho {
        result: Result<u32, PulseError>,
        last_timeout: u32,
    }

    impl EchoTimer for MockEcho {
        fn measure_high_pulse_us(&mut self, timeout_us: u32) -> Result<u32, PulseError> {
            self.last_timeout = timeout_us;
            self.result
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += ns as u64;
        }
    }

    fn sensor(result: Result<u32, PulseError>) -> HcSr04<MockTrigger, MockEcho, MockDelay> {
        let echo = MockEcho {
            result,
            last_timeout: 0,
        };
        HcSr04::new(
            MockTrigger::default(),
            echo,
            MockDelay::default(),
            DEFAULT_TIMEOUT_US,
        )
    }

    #[test]
    fn test_conversion() {
        // 580 µs -> 10 cm
        assert!((echo_to_metres(580) - 0.10).abs() < 1e-6);
        assert!((echo_to_metres(2900) - 0.50).abs() < 1e-6);
        assert_eq!(echo_to_metres(0), 0.0);
    }

    #[test]
    fn test_reading() {
        let mut s = sensor(Ok(3480));
        let d = s.read_distance_m().unwrap();
        assert!((d - 0.60).abs() < 1e-5);
        assert_eq!(s.echo.last_timeout, DEFAULT_TIMEOUT_US);
    }

    #[test]
    fn test_trigger_sequence() {
        let mut s = sensor(Ok(100));
        s.trigger.edges.clear();
        s.read_distance_m().unwrap();

        assert_eq!(s.trigger.edges, [false, true, false]);
        assert!(!s.trigger.is_set_high());
        assert_eq!(s.delay.total_ns, 12_000);
    }

    #[test]
    fn test_timeout() {
        let mut s = sensor(Err(PulseError::Timeout));
        assert_eq!(s.read_distance_m(), Err(SensorError::Timeout));
    }

    #[test]
    fn test_zero_width_echo_is_timeout() {
        let mut s = sensor(Ok(0));
        assert_eq!(s.read_distance_m(), Err(SensorError::Timeout));
    }

    #[test]
    fn test_trigger_starts_low() {
        let s = sensor(Ok(1));
        assert_eq!(s.trigger.edges, [false]);
    }
}
