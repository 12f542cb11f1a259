//! One polling-cycle snapshot

/// Snapshot of one polling cycle
///
/// Disconnected probes carry the `-127.0` sentinel and an invalid water
/// level is `-1.0`; `is_valid` is false in either case.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementPoint {
    /// Milliseconds since boot
    pub timestamp_ms: u64,
    /// Air temperature, °C
    pub ambient_c: f32,
    /// Ice surface temperature, °C
    pub surface_c: f32,
    /// Ice core temperature, °C
    pub inner_c: f32,
    /// Base plate temperature, °C
    pub base_c: f32,
    /// Meltwater level above the container floor, m
    pub water_level_m: f32,
    /// Melt progress, percent
    pub melt_progress: f32,
    /// Estimated seconds to full melt, if the block is gaining heat
    pub remaining_time_s: Option<f32>,
    /// All sensors answered
    pub is_valid: bool,
}

impl MeasurementPoint {
    /// Zeroed point used to fill unused log slots
    pub const EMPTY: Self = Self {
        timestamp_ms: 0,
        ambient_c: 0.0,
        surface_c: 0.0,
        inner_c: 0.0,
        base_c: 0.0,
        water_level_m: 0.0,
        melt_progress: 0.0,
        remaining_time_s: None,
        is_valid: false,
    };
}

/// Per-probe mean temperatures over a window of the log
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureAverages {
    pub ambient_c: f32,
    pub surface_c: f32,
    pub inner_c: f32,
    pub base_c: f32,
    /// Points in the window; 0 means the means are placeholders
    pub samples: usize,
}

impl TemperatureAverages {
    /// True if the window contained no points
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }
}
