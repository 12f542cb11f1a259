//! Bit-banged 1-Wire master
//!
//! Standard-speed slot timings from Maxim application note 126. The line
//! is open-drain: the output latch stays low and the pin switches between
//! output (pull low) and input (released, pulled up by the 4.7 kΩ
//! resistor). Each slot runs with interrupts disabled.

use embassy_rp::gpio::{AnyPin, Flex, Pull};
use embassy_rp::Peri;
use thawbox_hal::{OneWireBus, OneWireError};

use crate::spin_us;

/// Slot timings, µs
mod timing {
    pub const RESET_LOW: u32 = 480;
    pub const PRESENCE_WAIT: u32 = 70;
    pub const RESET_RECOVERY: u32 = 410;
    pub const WRITE_1_LOW: u32 = 6;
    pub const WRITE_1_RELEASE: u32 = 64;
    pub const WRITE_0_LOW: u32 = 60;
    pub const WRITE_0_RELEASE: u32 = 10;
    pub const READ_LOW: u32 = 6;
    pub const READ_SAMPLE: u32 = 9;
    pub const READ_RECOVERY: u32 = 55;
}

/// 1-Wire master on a single GPIO
pub struct FlexOneWire<'d> {
    pin: Flex<'d>,
}

impl<'d> FlexOneWire<'d> {
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        let mut pin = Flex::new(pin);
        pin.set_pull(Pull::Up);
        pin.set_low();
        pin.set_as_input();
        Self { pin }
    }

    fn pull_low(&mut self) {
        self.pin.set_as_output();
    }

    fn release(&mut self) {
        self.pin.set_as_input();
    }

    fn write_bit(&mut self, bit: bool) {
        let (low, release) = if bit {
            (timing::WRITE_1_LOW, timing::WRITE_1_RELEASE)
        } else {
            (timing::WRITE_0_LOW, timing::WRITE_0_RELEASE)
        };
        cortex_m::interrupt::free(|_| {
            self.pull_low();
            spin_us(low);
            self.release();
            spin_us(release);
        });
    }

    fn read_bit(&mut self) -> bool {
        cortex_m::interrupt::free(|_| {
            self.pull_low();
            spin_us(timing::READ_LOW);
            self.release();
            spin_us(timing::READ_SAMPLE);
            let bit = self.pin.is_high();
            spin_us(timing::READ_RECOVERY);
            bit
        })
    }
}

impl OneWireBus for FlexOneWire<'_> {
    fn reset(&mut self) -> Result<(), OneWireError> {
        // Nothing can pull the line high against a short
        if self.pin.is_low() {
            return Err(OneWireError::BusFault);
        }

        self.pull_low();
        spin_us(timing::RESET_LOW);
        let present = cortex_m::interrupt::free(|_| {
            self.release();
            spin_us(timing::PRESENCE_WAIT);
            self.pin.is_low()
        });
        spin_us(timing::RESET_RECOVERY);

        if present {
            Ok(())
        } else {
            Err(OneWireError::NoPresence)
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), OneWireError> {
        for i in 0..8 {
            self.write_bit(byte & (1 << i) != 0);
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, OneWireError> {
        let mut byte = 0u8;
        for i in 0..8 {
            if self.read_bit() {
                byte |= 1 << i;
            }
        }
        Ok(byte)
    }
}
