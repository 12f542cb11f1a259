//! Alert output and reset input drivers

pub mod gpio;

pub use gpio::{GpioAnnunciator, GpioResetButton};
