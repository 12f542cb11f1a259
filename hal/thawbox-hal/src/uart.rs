//! UART serial communication abstractions
//!
//! The WiFi co-processor is an AT-command modem on a UART. The modem driver
//! polls for received bytes against a deadline, so the receive side only
//! offers a non-blocking read.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been written or an error occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Read one byte if one is already waiting
    ///
    /// Returns `Ok(None)` immediately when the receive buffer is empty.
    fn try_read_byte(&mut self) -> Result<Option<u8>, Self::Error>;

    /// Discard everything currently waiting in the receive buffer
    ///
    /// Returns the number of bytes dropped.
    fn discard_pending(&mut self) -> Result<usize, Self::Error> {
        let mut dropped = 0;
        while self.try_read_byte()?.is_some() {
            dropped += 1;
        }
        Ok(dropped)
    }
}
