//! Mapping from measurements to uplink payloads
//!
//! | Field | Content                                   |
//! |-------|-------------------------------------------|
//! | 1-4   | ambient, surface, inner, base (°C)        |
//! | 5     | water level (mm)                          |
//! | 6     | melt progress (%)                         |
//! | 7     | remaining time (min), `-1` if no estimate |
//! | 8     | 1 if every sensor answered, else 0        |

use core::fmt::{self, Write};

use heapless::String;
use thawbox_protocol::{TelemetryRow, MAX_MESSAGE_LEN};

use crate::log::MeasurementPoint;
use crate::monitor::MeltStatus;

/// Field 7 value when the model has no estimate
pub const NO_ESTIMATE: f32 = -1.0;

/// Build the telemetry row for one measurement
pub fn telemetry_row(point: &MeasurementPoint) -> TelemetryRow {
    let remaining_min = point
        .remaining_time_s
        .map(|s| s / 60.0)
        .unwrap_or(NO_ESTIMATE);

    TelemetryRow::from_values([
        point.ambient_c,
        point.surface_c,
        point.inner_c,
        point.base_c,
        point.water_level_m * 1000.0,
        point.melt_progress,
        remaining_min,
        if point.is_valid { 1.0 } else { 0.0 },
    ])
}

/// Notification text announcing a completed melt
pub fn completion_message(
    point: &MeasurementPoint,
    status: &MeltStatus,
) -> Result<String<MAX_MESSAGE_LEN>, fmt::Error> {
    let mut msg = String::new();
    write!(
        msg,
        "Ice melted after {} min. Model: {}, water level: {}",
        point.timestamp_ms / 60_000,
        yes_no(status.model_melted),
        yes_no(status.water_confirmed),
    )?;
    if point.water_level_m >= 0.0 {
        write!(msg, " ({:.1} mm)", point.water_level_m * 1000.0)?;
    }
    write!(msg, ", progress {:.0}%", point.melt_progress)?;
    Ok(msg)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
