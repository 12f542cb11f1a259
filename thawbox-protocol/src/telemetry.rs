//! Telemetry rows for the metrics endpoint
//!
//! A row carries up to eight numeric fields, serialized as a form body
//! `field1=..&field2=..` with two decimals. Unset or non-finite fields are
//! left out of the body.

use core::fmt::{self, Write};

use heapless::String;

use crate::request::{EncodeError, Request};

/// Number of fields in a telemetry row
pub const FIELD_COUNT: usize = 8;

/// Maximum size of an encoded form body
pub const MAX_FORM_SIZE: usize = 192;

/// Form content type used for telemetry posts
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// One row of up to eight numeric telemetry fields
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryRow {
    fields: [Option<f32>; FIELD_COUNT],
}

impl TelemetryRow {
    /// Create an empty row
    pub const fn new() -> Self {
        Self {
            fields: [None; FIELD_COUNT],
        }
    }

    /// Create a row with all eight fields set
    pub const fn from_values(values: [f32; FIELD_COUNT]) -> Self {
        let mut fields = [None; FIELD_COUNT];
        let mut i = 0;
        while i < FIELD_COUNT {
            fields[i] = Some(values[i]);
            i += 1;
        }
        Self { fields }
    }

    /// Set field `number` (1-based, as on the wire); out-of-range numbers are ignored
    pub fn set(&mut self, number: usize, value: f32) {
        if let Some(slot) = number.checked_sub(1).and_then(|i| self.fields.get_mut(i)) {
            *slot = Some(value);
        }
    }

    /// Builder form of [`TelemetryRow::set`]
    pub fn with(mut self, number: usize, value: f32) -> Self {
        self.set(number, value);
        self
    }

    /// Read field `number` (1-based)
    pub fn get(&self, number: usize) -> Option<f32> {
        number
            .checked_sub(1)
            .and_then(|i| self.fields.get(i))
            .copied()
            .flatten()
    }

    /// Number of fields that will be sent
    pub fn len(&self) -> usize {
        self.fields
            .iter()
            .filter(|f| f.is_some_and(f32::is_finite))
            .count()
    }

    /// True if no field will be sent
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the form body into any `fmt::Write` sink
    pub fn write_form<W: Write>(&self, out: &mut W) -> fmt::Result {
        let mut first = true;
        for (i, field) in self.fields.iter().enumerate() {
            let Some(value) = field.filter(|v| v.is_finite()) else {
                continue;
            };
            if !first {
                out.write_char('&')?;
            }
            write!(out, "field{}={:.2}", i + 1, value)?;
            first = false;
        }
        Ok(())
    }

    /// Encode the form body into a fixed-capacity string
    pub fn encode_form(&self) -> Result<String<MAX_FORM_SIZE>, EncodeError> {
        let mut out = String::new();
        self.write_form(&mut out)
            .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(out)
    }
}

/// Metrics endpoint that accepts telemetry rows
#[derive(Debug, Clone, Copy)]
pub struct TelemetryEndpoint<'a> {
    /// Server host name
    pub host: &'a str,
    /// Update path (e.g. "/update")
    pub path: &'a str,
    /// Write API key sent in the `X-THINGSPEAKAPIKEY` header
    pub api_key: &'a str,
}

impl<'a> TelemetryEndpoint<'a> {
    /// Build the POST request carrying an already-encoded form body
    pub fn request(&self, form: &'a str) -> Result<Request<'a>, EncodeError> {
        Ok(Request::post(self.host, self.path)
            .header("Connection", "close")?
            .header("X-THINGSPEAKAPIKEY", self.api_key)?
            .body(FORM_CONTENT_TYPE, form))
    }
}
