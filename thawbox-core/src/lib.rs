//! Board-agnostic core logic for the ice-melt experiment box
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Sensor, alert and uplink traits (implemented in `thawbox-drivers`)
//! - Heat-transfer melt model (energy budget, heat flux, progress)
//! - Fixed-capacity measurement log with windowed averages
//! - Alert state machine (buzzer + indicator, reset button)
//! - Sensor hub that validates raw probe readings
//! - Monitor: one iteration of the polling loop
//! - Configuration types and the startup config parser

#![no_std]
#![deny(unsafe_code)]

pub mod alert;
pub mod config;
pub mod log;
pub mod model;
pub mod monitor;
pub mod sensors;
pub mod telemetry;
pub mod traits;
