//! Physical melt-estimation model
//!
//! Integrates the heat flowing into the ice block and tracks how much of
//! the energy budget needed to melt it has been delivered.

pub mod melt;

pub use melt::{calculate_initial_energy, MeltModel, ModelError};
