//! Measurement log
//!
//! A fixed-capacity ring of measurement points with logical, oldest-first
//! indexing and windowed temperature averages.

pub mod point;
pub mod ring;

pub use point::{MeasurementPoint, TemperatureAverages};
pub use ring::{MeasurementLog, LOG_CAPACITY};
