//! Percent-encoding for query strings and form bodies
//!
//! Encoding rules (byte-wise over the UTF-8 input):
//! - ASCII alphanumerics pass through unchanged
//! - space becomes `+`
//! - every other byte becomes `%XX` with uppercase hex digits

use core::fmt::{self, Write};

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode `input` into any `fmt::Write` sink
pub fn percent_encode<W: Write>(input: &str, out: &mut W) -> fmt::Result {
    for &byte in input.as_bytes() {
        if byte.is_ascii_alphanumeric() {
            out.write_char(byte as char)?;
        } else if byte == b' ' {
            out.write_char('+')?;
        } else {
            out.write_char('%')?;
            out.write_char(HEX_UPPER[(byte >> 4) as usize] as char)?;
            out.write_char(HEX_UPPER[(byte & 0x0F) as usize] as char)?;
        }
    }
    Ok(())
}

/// Length of `input` once percent-encoded
pub fn encoded_len(input: &str) -> usize {
    input
        .as_bytes()
        .iter()
        .map(|&b| {
            if b.is_ascii_alphanumeric() || b == b' ' {
                1
            } else {
                3
            }
        })
        .sum()
}

/// Display adapter that percent-encodes the wrapped string
///
/// ```
/// use thawbox_protocol::PercentEncoded;
/// use core::fmt::Write;
///
/// let mut out: heapless::String<32> = heapless::String::new();
/// write!(out, "author={}", PercentEncoded("LIL G4")).unwrap();
/// assert_eq!(out.as_str(), "author=LIL+G4");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PercentEncoded<'a>(pub &'a str);

impl fmt::Display for PercentEncoded<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        percent_encode(self.0, f)
    }
}
