//! Dallas 1-Wire bus abstractions
//!
//! Each temperature probe sits alone on its own 1-Wire line, so the trait
//! only covers the byte-level primitives; ROM search is not needed.

/// ROM command: address every device on the bus
pub const SKIP_ROM: u8 = 0xCC;

/// Errors reported by a 1-Wire bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneWireError {
    /// No device answered the reset pulse
    NoPresence,
    /// Line stuck low or a timing slot could not be completed
    BusFault,
}

/// 1-Wire bus master
pub trait OneWireBus {
    /// Issue a reset pulse and sample the presence pulse
    ///
    /// Returns `Err(OneWireError::NoPresence)` when nothing is connected.
    fn reset(&mut self) -> Result<(), OneWireError>;

    /// Write one byte, least significant bit first
    fn write_byte(&mut self, byte: u8) -> Result<(), OneWireError>;

    /// Read one byte, least significant bit first
    fn read_byte(&mut self) -> Result<u8, OneWireError>;

    /// Write a sequence of bytes
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), OneWireError> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Fill `buf` with bytes read from the bus
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<(), OneWireError> {
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(())
    }
}

/// Dallas/Maxim CRC-8 (polynomial x^8 + x^5 + x^4 + 1, reflected 0x8C)
///
/// Running the CRC over a block that ends with its own CRC byte yields 0.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut b = byte;
        for _ in 0..8 {
            let mix = (crc ^ b) & 0x01;
            crc >>= 1;
            if mix != 0 {
                crc ^= 0x8C;
            }
            b >>= 1;
        }
    }
    crc
}
