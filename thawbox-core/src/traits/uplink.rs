//! Telemetry and notification uplink

use thawbox_protocol::{EncodeError, TelemetryRow};

/// Errors reported by an uplink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UplinkError {
    /// No network association
    NotConnected,
    /// WiFi join failed after all retries
    JoinFailed,
    /// Could not open a connection to the server
    ConnectFailed,
    /// Request could not be written
    SendFailed,
    /// Server answered with a non-2xx status
    Rejected(u16),
    /// No (complete) answer within the drain timeout
    Timeout,
    /// Request did not fit its buffer
    Encode,
}

impl From<EncodeError> for UplinkError {
    fn from(_: EncodeError) -> Self {
        UplinkError::Encode
    }
}

/// Outbound link for telemetry rows and completion notifications
///
/// Failures are returned to the caller; the polling loop logs them and
/// keeps running offline.
pub trait Uplink {
    /// Push one telemetry row
    fn push_telemetry(&mut self, row: &TelemetryRow) -> Result<(), UplinkError>;

    /// Send a free-text notification
    fn push_notification(
        &mut self,
        author: &str,
        secret: &str,
        message: &str,
    ) -> Result<(), UplinkError>;
}
