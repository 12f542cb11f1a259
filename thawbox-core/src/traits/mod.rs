//! Hardware and service abstraction traits
//!
//! These traits define the interface between the application logic
//! and the drivers in `thawbox-drivers`.

pub mod alert;
pub mod sensor;
pub mod uplink;

pub use alert::{Annunciator, ResetInput};
pub use sensor::{DistanceSensor, SensorError, TemperatureSensor};
pub use uplink::{Uplink, UplinkError};
