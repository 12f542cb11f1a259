//! Sensor drivers

pub mod ds18b20;
pub mod hcsr04;

pub use ds18b20::Ds18b20;
pub use hcsr04::HcSr04;
