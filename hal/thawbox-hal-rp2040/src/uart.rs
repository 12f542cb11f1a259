//! Buffered UART towards the WiFi co-processor
//!
//! Interrupt-driven ring buffers sit behind the blocking `embedded-io`
//! traits, so polling for a received byte never stalls.

use embassy_rp::uart::{BufferedUart, Error};
use embedded_io::{Read, ReadReady, Write};
use thawbox_hal::{UartRx, UartTx};

/// Modem link on a buffered UART
pub struct ModemUart {
    uart: BufferedUart,
}

impl ModemUart {
    pub fn new(uart: BufferedUart) -> Self {
        Self { uart }
    }
}

impl UartTx for ModemUart {
    type Error = Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Error> {
        self.uart.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Error> {
        Write::flush(&mut self.uart)
    }
}

impl UartRx for ModemUart {
    type Error = Error;

    fn try_read_byte(&mut self) -> Result<Option<u8>, Error> {
        if !self.uart.read_ready()? {
            return Ok(None);
        }
        let mut byte = [0u8; 1];
        let n = self.uart.read(&mut byte)?;
        Ok((n == 1).then_some(byte[0]))
    }
}
