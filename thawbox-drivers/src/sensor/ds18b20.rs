//! DS18B20 digital temperature probe
//!
//! One probe per 1-Wire line, addressed with Skip ROM. A reading is:
//!
//! 1. reset, Skip ROM, Convert T (0x44)
//! 2. wait for the conversion (750 ms at 12-bit resolution)
//! 3. reset, Skip ROM, Read Scratchpad (0xBE), 9 bytes
//! 4. check the CRC in byte 8, decode bytes 0-1 as signed 1/16 °C
//!
//! `start_conversion` performs step 1 only and notes the time, so a caller
//! can start every probe and then wait once.

use embedded_hal::delay::DelayNs;
use thawbox_core::traits::{SensorError, TemperatureSensor};
use thawbox_hal::onewire::{crc8, OneWireBus, OneWireError, SKIP_ROM};
use thawbox_hal::Clock;

/// Function commands
pub mod command {
    /// Start a temperature conversion
    pub const CONVERT_T: u8 = 0x44;
    /// Write TH, TL and the configuration register
    pub const WRITE_SCRATCHPAD: u8 = 0x4E;
    /// Read the 9-byte scratchpad
    pub const READ_SCRATCHPAD: u8 = 0xBE;
}

/// Conversion time at 12-bit resolution
pub const CONVERSION_TIME_MS: u64 = 750;

/// Configuration register value for 12-bit resolution
pub const RESOLUTION_12_BIT: u8 = 0x7F;

/// Alarm thresholds written with the configuration (factory defaults)
const ALARM_HIGH: u8 = 0x4B;
const ALARM_LOW: u8 = 0x46;

/// Raw value held in the scratchpad after power-on (85 °C)
const POWER_ON_RAW: i16 = 0x0550;

/// Datasheet measuring range
const MIN_C: f32 = -55.0;
const MAX_C: f32 = 125.0;

/// Scratchpad length including CRC
pub const SCRATCHPAD_LEN: usize = 9;

/// DS18B20 probe on a dedicated 1-Wire bus
pub struct Ds18b20<B, D, C> {
    bus: B,
    delay: D,
    clock: C,
    /// When the pending conversion was started
    conversion_started_ms: Option<u64>,
}

impl<B: OneWireBus, D: DelayNs, C: Clock> Ds18b20<B, D, C> {
    /// Create a probe driver
    ///
    /// No bus traffic happens until [`Ds18b20::init`] or the first reading.
    pub fn new(bus: B, delay: D, clock: C) -> Self {
        Self {
            bus,
            delay,
            clock,
            conversion_started_ms: None,
        }
    }

    /// Check for presence and select 12-bit resolution
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.command(command::WRITE_SCRATCHPAD)?;
        self.bus
            .write_bytes(&[ALARM_HIGH, ALARM_LOW, RESOLUTION_12_BIT])
            .map_err(bus_error)
    }

    /// Read the raw scratchpad; see [`decode_scratchpad`]
    pub fn read_scratchpad(&mut self) -> Result<[u8; SCRATCHPAD_LEN], SensorError> {
        self.command(command::READ_SCRATCHPAD)?;
        let mut scratchpad = [0u8; SCRATCHPAD_LEN];
        self.bus.read_bytes(&mut scratchpad).map_err(bus_error)?;
        Ok(scratchpad)
    }

    /// Release the bus
    pub fn release(self) -> B {
        self.bus
    }

    /// Reset, address the probe, send a function command
    fn command(&mut self, cmd: u8) -> Result<(), SensorError> {
        self.bus.reset().map_err(bus_error)?;
        self.bus.write_bytes(&[SKIP_ROM, cmd]).map_err(bus_error)
    }

    fn wait_for_conversion(&mut self, started_ms: u64) {
        let elapsed = self.clock.elapsed_ms(started_ms);
        if elapsed < CONVERSION_TIME_MS {
            self.delay.delay_ms((CONVERSION_TIME_MS - elapsed) as u32);
        }
    }
}

impl<B: OneWireBus, D: DelayNs, C: Clock> TemperatureSensor for Ds18b20<B, D, C> {
    fn start_conversion(&mut self) -> Result<(), SensorError> {
        self.conversion_started_ms = None;
        self.command(command::CONVERT_T)?;
        self.conversion_started_ms = Some(self.clock.now_ms());
        Ok(())
    }

    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        let started = match self.conversion_started_ms {
            Some(t) => t,
            None => {
                self.start_conversion()?;
                self.conversion_started_ms.unwrap_or_default()
            }
        };
        self.wait_for_conversion(started);
        self.conversion_started_ms = None;

        let scratchpad = self.read_scratchpad()?;
        decode_scratchpad(&scratchpad)
    }
}

/// Decode a scratchpad into degrees Celsius
///
/// Rejects bad CRCs, an all-zero scratchpad (line held low), the power-on
/// value 85 °C and anything outside the datasheet range.
pub fn decode_scratchpad(scratchpad: &[u8; SCRATCHPAD_LEN]) -> Result<f32, SensorError> {
    if scratchpad.iter().all(|&b| b == 0) {
        return Err(SensorError::Disconnected);
    }
    if crc8(&scratchpad[..8]) != scratchpad[8] {
        return Err(SensorError::CrcMismatch);
    }

    let raw = i16::from_le_bytes([scratchpad[0], scratchpad[1]]);
    if raw == POWER_ON_RAW {
        return Err(SensorError::OutOfRange);
    }

    let celsius = raw as f32 / 16.0;
    if !(MIN_C..=MAX_C).contains(&celsius) {
        return Err(SensorError::OutOfRange);
    }
    Ok(celsius)
}

fn bus_error(e: OneWireError) -> SensorError {
    match e {
        OneWireError::NoPresence => SensorError::Disconnected,
        OneWireError::BusFault => SensorError::Bus,
    }
}
