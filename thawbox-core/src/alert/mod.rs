//! Completion alert
//!
//! Drives the buzzer and indicator once the block has melted and listens
//! for the operator's reset.

pub mod controller;

pub use controller::{AlertController, AlertState, AlertUpdate};
