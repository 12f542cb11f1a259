//! Sensor aggregation
//!
//! Turns raw probe results into validated readings for one cycle.

pub mod hub;

pub use hub::{
    water_confirms_melt, Probe, SensorHub, TemperatureReadings, WaterLevelData, DISCONNECTED_C,
    INVALID_LEVEL_M,
};
