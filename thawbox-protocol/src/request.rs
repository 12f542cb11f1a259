//! Typed HTTP/1.1 request builder
//!
//! A request is assembled from typed parts (method, host, path, query
//! parameters, headers, body) and serialized in one pass. Query values are
//! percent-encoded during serialization; header values and bodies are
//! written verbatim.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::encoding::PercentEncoded;

/// Maximum extra headers per request (Host and Content-* are implicit)
pub const MAX_HEADERS: usize = 6;

/// Maximum query parameters per request
pub const MAX_QUERY_PARAMS: usize = 4;

/// Maximum serialized request size in bytes
pub const MAX_REQUEST_SIZE: usize = 1024;

/// Errors that can occur while building or encoding a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// More than [`MAX_HEADERS`] headers were added
    TooManyHeaders,
    /// More than [`MAX_QUERY_PARAMS`] query parameters were added
    TooManyParams,
    /// Serialized request does not fit the output buffer
    BufferTooSmall,
}

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Method token as it appears on the request line
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// An HTTP/1.1 request borrowing its parts from the caller
#[derive(Debug, Clone)]
pub struct Request<'a> {
    method: Method,
    host: &'a str,
    path: &'a str,
    query: Vec<(&'a str, &'a str), MAX_QUERY_PARAMS>,
    headers: Vec<(&'a str, &'a str), MAX_HEADERS>,
    content_type: Option<&'a str>,
    body: &'a str,
}

impl<'a> Request<'a> {
    /// Start a request with the given method
    pub fn new(method: Method, host: &'a str, path: &'a str) -> Self {
        Self {
            method,
            host,
            path,
            query: Vec::new(),
            headers: Vec::new(),
            content_type: None,
            body: "",
        }
    }

    /// Start a GET request
    pub fn get(host: &'a str, path: &'a str) -> Self {
        Self::new(Method::Get, host, path)
    }

    /// Start a POST request
    pub fn post(host: &'a str, path: &'a str) -> Self {
        Self::new(Method::Post, host, path)
    }

    /// Append a query parameter (value is percent-encoded on output)
    pub fn query(mut self, key: &'a str, value: &'a str) -> Result<Self, EncodeError> {
        self.query
            .push((key, value))
            .map_err(|_| EncodeError::TooManyParams)?;
        Ok(self)
    }

    /// Append a header line
    pub fn header(mut self, name: &'a str, value: &'a str) -> Result<Self, EncodeError> {
        self.headers
            .push((name, value))
            .map_err(|_| EncodeError::TooManyHeaders)?;
        Ok(self)
    }

    /// Attach a body and its content type
    ///
    /// `Content-Length` is derived from the body when the request is encoded.
    pub fn body(mut self, content_type: &'a str, body: &'a str) -> Self {
        self.content_type = Some(content_type);
        self.body = body;
        self
    }

    /// Request method
    pub fn method(&self) -> Method {
        self.method
    }

    /// Target host (sent as the `Host` header)
    pub fn host(&self) -> &'a str {
        self.host
    }

    /// Request path without the query string
    pub fn path(&self) -> &'a str {
        self.path
    }

    /// Request body
    pub fn body_str(&self) -> &'a str {
        self.body
    }

    /// Serialize the request into any `fmt::Write` sink
    pub fn write_to<W: Write>(&self, out: &mut W) -> fmt::Result {
        write!(out, "{} {}", self.method.as_str(), self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(out, "{}{}={}", sep, key, PercentEncoded(value))?;
        }
        out.write_str(" HTTP/1.1\r\n")?;

        write!(out, "Host: {}\r\n", self.host)?;
        for (name, value) in &self.headers {
            write!(out, "{}: {}\r\n", name, value)?;
        }

        if let Some(content_type) = self.content_type {
            write!(out, "Content-Type: {}\r\n", content_type)?;
        }
        if self.content_type.is_some() || self.method == Method::Post {
            write!(out, "Content-Length: {}\r\n", self.body.len())?;
        }

        out.write_str("\r\n")?;
        out.write_str(self.body)
    }

    /// Exact serialized length in bytes
    pub fn encoded_len(&self) -> usize {
        let mut counter = LenCounter(0);
        // LenCounter never fails
        let _ = self.write_to(&mut counter);
        counter.0
    }

    /// Serialize into a fixed-capacity string
    pub fn encode(&self) -> Result<String<MAX_REQUEST_SIZE>, EncodeError> {
        let mut out = String::new();
        self.write_to(&mut out)
            .map_err(|_| EncodeError::BufferTooSmall)?;
        Ok(out)
    }
}

/// `fmt::Write` sink that only counts bytes
struct LenCounter(usize);

impl Write for LenCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}
