//! ESP-AT WiFi co-processor driver
//!
//! The co-processor runs Espressif's AT firmware in single-connection
//! mode. Every command is one line terminated by CRLF and answered by
//! zero or more information lines followed by a final `OK`, `ERROR` or
//! `FAIL`. Sending data is a two-step exchange:
//!
//! ```text
//! > AT+CIPSEND=<len>        < OK
//!                           < >
//! > <len raw bytes>         < Recv <len> bytes
//!                           < SEND OK
//!                           < +IPD,<n>:HTTP/1.1 200 OK ...
//!                           < CLOSED
//! ```
//!
//! All waits poll the UART against a [`Clock`] deadline.

use core::fmt::{self, Write};

use embedded_hal::delay::DelayNs;
use heapless::{String, Vec};
use thawbox_hal::{Clock, UartRx, UartTx};

/// Longest response line kept; the rest of a longer line is dropped
pub const LINE_LEN: usize = 128;

/// Command buffer size (fits a join with maximum-length credentials)
const COMMAND_LEN: usize = 256;

/// Sleep between empty receive polls
const POLL_INTERVAL_MS: u32 = 1;

/// Modem driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModemError {
    /// No final response before the deadline
    Timeout,
    /// The modem answered `ERROR`, `FAIL` or `SEND FAIL`
    Rejected,
    /// The UART reported an error
    Uart,
    /// A command did not fit its buffer
    Overflow,
}

impl From<fmt::Error> for ModemError {
    fn from(_: fmt::Error) -> Self {
        ModemError::Overflow
    }
}

/// Transport for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Link {
    /// Plain TCP
    Tcp,
    /// TLS, handled by the co-processor
    Ssl,
}

impl Link {
    fn as_str(self) -> &'static str {
        match self {
            Link::Tcp => "TCP",
            Link::Ssl => "SSL",
        }
    }
}

/// How long to keep reading a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Drain {
    pub timeout_ms: u64,
    /// Restart the timeout whenever a byte arrives
    pub restart_on_data: bool,
}

/// What was seen while draining a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Response {
    /// Status code from the first HTTP status line, if one arrived
    pub status: Option<u16>,
    /// The server closed the connection
    pub closed: bool,
}

impl Response {
    /// True unless a non-2xx status was seen
    pub fn is_success(&self) -> bool {
        self.status.map_or(true, |s| (200..300).contains(&s))
    }
}

/// A WiFi modem carrying one connection at a time
pub trait Modem {
    /// Associate with an access point unless already associated
    fn join(&mut self, ssid: &str, password: &str) -> Result<(), ModemError>;

    /// Open a connection to `host:port`
    fn connect(&mut self, link: Link, host: &str, port: u16) -> Result<(), ModemError>;

    /// Send bytes over the open connection
    fn send(&mut self, data: &[u8]) -> Result<(), ModemError>;

    /// Read the response until the server closes or the timeout expires
    ///
    /// Returns `Err(ModemError::Timeout)` only if the timeout expired
    /// before any status line arrived.
    fn drain(&mut self, drain: Drain) -> Result<Response, ModemError>;

    /// Close the open connection
    fn close(&mut self) -> Result<(), ModemError>;
}

/// Per-command timeouts and join policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModemTiming {
    /// Plain commands (AT, CWJAP?, CIPCLOSE, CIPSEND prompt)
    pub command_timeout_ms: u64,
    /// One join attempt
    pub join_timeout_ms: u64,
    /// CIPSTART, including the TLS handshake
    pub connect_timeout_ms: u64,
    /// Payload transfer until `SEND OK`
    pub send_timeout_ms: u64,
    /// Join attempts before giving up
    pub join_attempts: u8,
    /// Pause between join attempts
    pub join_retry_delay_ms: u64,
}

impl Default for ModemTiming {
    fn default() -> Self {
        Self {
            command_timeout_ms: 2000,
            join_timeout_ms: 20_000,
            connect_timeout_ms: 10_000,
            send_timeout_ms: 5000,
            join_attempts: 5,
            join_retry_delay_ms: 5000,
        }
    }
}

/// Response line with the CRLF stripped
type Line = Vec<u8, LINE_LEN>;

/// ESP-AT modem on a UART
pub struct EspAtModem<U, C, D> {
    uart: U,
    clock: C,
    delay: D,
    timing: ModemTiming,
    line: Line,
    /// Status line that arrived while waiting for `SEND OK`
    early_status: Option<u16>,
    /// `CLOSED` arrived while waiting for `SEND OK`
    early_close: bool,
}

impl<U, C, D> EspAtModem<U, C, D>
where
    U: UartTx + UartRx,
    C: Clock,
    D: DelayNs,
{
    pub fn new(uart: U, clock: C, delay: D, timing: ModemTiming) -> Self {
        Self {
            uart,
            clock,
            delay,
            timing,
            line: Vec::new(),
            early_status: None,
            early_close: false,
        }
    }

    /// Check the modem answers and put it in station, single-link mode
    pub fn init(&mut self) -> Result<(), ModemError> {
        self.command(format_args!("AT"))?;
        self.command(format_args!("ATE0"))?;
        self.command(format_args!("AT+CWMODE=1"))?;
        self.command(format_args!("AT+CIPMUX=0"))
    }

    /// True if the modem reports an association
    pub fn is_joined(&mut self) -> Result<bool, ModemError> {
        let mut joined = false;
        self.command_with(
            format_args!("AT+CWJAP?"),
            self.timing.command_timeout_ms,
            |line| joined |= line.starts_with(b"+CWJAP:"),
        )?;
        Ok(joined)
    }

    /// Give back the UART
    pub fn release(self) -> U {
        self.uart
    }

    fn command(&mut self, cmd: fmt::Arguments<'_>) -> Result<(), ModemError> {
        self.command_with(cmd, self.timing.command_timeout_ms, |_| {})
    }

    /// Send one command and wait for its final response
    ///
    /// `on_line` sees every information line before the final one.
    fn command_with(
        &mut self,
        cmd: fmt::Arguments<'_>,
        timeout_ms: u64,
        mut on_line: impl FnMut(&[u8]),
    ) -> Result<(), ModemError> {
        self.write_command(cmd)?;

        let deadline = self.clock.now_ms() + timeout_ms;
        loop {
            let line = self.read_line(deadline)?;
            match line.as_slice() {
                b"OK" => return Ok(()),
                b"ERROR" | b"FAIL" => return Err(ModemError::Rejected),
                other => on_line(other),
            }
        }
    }

    fn write_command(&mut self, cmd: fmt::Arguments<'_>) -> Result<(), ModemError> {
        let mut buf: String<COMMAND_LEN> = String::new();
        buf.write_fmt(cmd)?;
        buf.push_str("\r\n").map_err(|_| ModemError::Overflow)?;

        // Leftovers from an earlier exchange would be taken as our answer
        self.uart.discard_pending().map_err(|_| ModemError::Uart)?;
        self.line.clear();
        self.write_raw(buf.as_bytes())
    }

    fn write_raw(&mut self, data: &[u8]) -> Result<(), ModemError> {
        self.uart.write_blocking(data).map_err(|_| ModemError::Uart)?;
        self.uart.flush().map_err(|_| ModemError::Uart)
    }

    fn read_byte(&mut self, deadline_ms: u64) -> Result<u8, ModemError> {
        loop {
            if let Some(byte) = self.uart.try_read_byte().map_err(|_| ModemError::Uart)? {
                return Ok(byte);
            }
            if self.clock.now_ms() >= deadline_ms {
                return Err(ModemError::Timeout);
            }
            self.delay.delay_ms(POLL_INTERVAL_MS);
        }
    }

    /// Delay for `ms`, in `u32` steps for the `DelayNs` interface
    fn pause_ms(&mut self, ms: u64) {
        let mut left = ms;
        while left > 0 {
            let step = left.min(u32::MAX as u64) as u32;
            self.delay.delay_ms(step);
            left -= step as u64;
        }
    }

    /// Feed one byte to the line buffer; true once a non-empty line is complete
    fn push_byte(&mut self, byte: u8) -> bool {
        if byte == b'\n' {
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
            !self.line.is_empty()
        } else {
            // Excess bytes of an overlong line are dropped
            let _ = self.line.push(byte);
            false
        }
    }

    fn read_line(&mut self, deadline_ms: u64) -> Result<Line, ModemError> {
        loop {
            let byte = self.read_byte(deadline_ms)?;
            if self.push_byte(byte) {
                let line = self.line.clone();
                self.line.clear();
                return Ok(line);
            }
        }
    }

    fn wait_prompt(&mut self, deadline_ms: u64) -> Result<(), ModemError> {
        loop {
            let byte = self.read_byte(deadline_ms)?;
            if byte == b'>' && self.line.is_empty() {
                return Ok(());
            }
            if self.push_byte(byte) {
                let rejected = matches!(self.line.as_slice(), b"ERROR" | b"FAIL");
                self.line.clear();
                if rejected {
                    return Err(ModemError::Rejected);
                }
            }
        }
    }

    fn note_response_line(line: &[u8], response: &mut Response) {
        if response.status.is_none() {
            response.status = parse_status(line);
        }
        if line.ends_with(b"CLOSED") {
            response.closed = true;
        }
    }
}

impl<U, C, D> Modem for EspAtModem<U, C, D>
where
    U: UartTx + UartRx,
    C: Clock,
    D: DelayNs,
{
    fn join(&mut self, ssid: &str, password: &str) -> Result<(), ModemError> {
        if self.is_joined()? {
            return Ok(());
        }

        let attempts = self.timing.join_attempts.max(1);
        let mut result = Err(ModemError::Rejected);
        for attempt in 1..=attempts {
            result = self.command_with(
                format_args!("AT+CWJAP={},{}", Quoted(ssid), Quoted(password)),
                self.timing.join_timeout_ms,
                |_| {},
            );
            if result.is_ok() || attempt == attempts {
                break;
            }
            self.pause_ms(self.timing.join_retry_delay_ms);
        }
        result
    }

    fn connect(&mut self, link: Link, host: &str, port: u16) -> Result<(), ModemError> {
        let mut already = false;
        let result = self.command_with(
            format_args!("AT+CIPSTART=\"{}\",{},{}", link.as_str(), Quoted(host), port),
            self.timing.connect_timeout_ms,
            |line| already |= line == b"ALREADY CONNECTED",
        );

        match result {
            // A stale link from an earlier exchange; drop it and try once more
            Err(ModemError::Rejected) if already => {
                let _ = self.close();
                self.command_with(
                    format_args!("AT+CIPSTART=\"{}\",{},{}", link.as_str(), Quoted(host), port),
                    self.timing.connect_timeout_ms,
                    |_| {},
                )
            }
            other => other,
        }
    }

    fn send(&mut self, data: &[u8]) -> Result<(), ModemError> {
        self.early_status = None;
        self.early_close = false;

        self.write_command(format_args!("AT+CIPSEND={}", data.len()))?;
        let deadline = self.clock.now_ms() + self.timing.command_timeout_ms;
        self.wait_prompt(deadline)?;

        self.line.clear();
        self.write_raw(data)?;

        let deadline = self.clock.now_ms() + self.timing.send_timeout_ms;
        let mut seen = Response::default();
        loop {
            let line = self.read_line(deadline)?;
            match line.as_slice() {
                b"SEND OK" => break,
                b"SEND FAIL" | b"ERROR" => return Err(ModemError::Rejected),
                other => Self::note_response_line(other, &mut seen),
            }
        }
        self.early_status = seen.status;
        self.early_close = seen.closed;
        Ok(())
    }

    fn drain(&mut self, drain: Drain) -> Result<Response, ModemError> {
        let mut response = Response {
            status: self.early_status.take(),
            closed: core::mem::take(&mut self.early_close),
        };

        let mut deadline = self.clock.now_ms() + drain.timeout_ms;
        while !response.closed {
            let byte = match self.read_byte(deadline) {
                Ok(byte) => byte,
                Err(ModemError::Timeout) if response.status.is_some() => break,
                Err(e) => return Err(e),
            };
            if drain.restart_on_data {
                deadline = self.clock.now_ms() + drain.timeout_ms;
            }
            if self.push_byte(byte) {
                Self::note_response_line(&self.line, &mut response);
                self.line.clear();
            }
        }
        Ok(response)
    }

    fn close(&mut self) -> Result<(), ModemError> {
        self.command(format_args!("AT+CIPCLOSE"))
    }
}

/// Status code of an HTTP status line, wherever it starts in `line`
///
/// `+IPD,<n>:` prefixes are skipped by searching for `HTTP/1.`.
pub fn parse_status(line: &[u8]) -> Option<u16> {
    const MARKER: &[u8] = b"HTTP/1.";
    let start = line.windows(MARKER.len()).position(|w| w == MARKER)?;
    // "HTTP/1.x " then three digits
    let code = line.get(start + MARKER.len() + 2..start + MARKER.len() + 5)?;
    if line.get(start + MARKER.len() + 1) != Some(&b' ') {
        return None;
    }
    code.iter().try_fold(0u16, |acc, &d| {
        d.is_ascii_digit().then(|| acc * 10 + u16::from(d - b'0'))
    })
}

/// Double-quoted AT string argument with `"`, `,` and `\` escaped
struct Quoted<'a>(&'a str);

impl fmt::Display for Quoted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char('"')?;
        for c in self.0.chars() {
            if matches!(c, '"' | ',' | '\\') {
                f.write_char('\\')?;
            }
            f.write_char(c)?;
        }
        f.write_char('"')
    }
}
