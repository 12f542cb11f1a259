//! Polling-loop logic
//!
//! One call per loop iteration ties the sensors, the melt model and the
//! measurement log together and decides what the loop should do next.

pub mod cycle;

pub use cycle::{CycleReport, MeltStatus, Monitor};
