//! Heat-transfer melt model
//!
//! The block gains heat two ways:
//! - convection from the air over five of its six faces
//! - conduction through the base plate on the remaining face
//!
//! The energy budget is the sensible heat to bring the ice to 0 °C plus the
//! latent heat to melt it. Each cycle the current heat flux is multiplied by
//! the elapsed time and moved from `total_energy` (still required) to
//! `accumulated_energy` (delivered so far).
//!
//! `total_energy` is floored at zero; `accumulated_energy` is not capped and
//! keeps growing after the block is theoretically melted. Progress is
//! reported against the latent heat alone and clamped to 0..=100 %.

use crate::config::{IceConfig, PhysicalConstants};

/// Share of the surface exposed to air (five faces of a cube)
const CONVECTION_SHARE: f32 = 5.0 / 6.0;

/// Share of the surface resting on the base plate (one face of a cube)
const CONDUCTION_SHARE: f32 = 1.0 / 6.0;

/// Errors constructing a melt model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModelError {
    /// Mass is zero, negative or not finite
    InvalidMass,
    /// Initial temperature is above 0 °C or not finite
    InvalidTemperature,
}

/// Energy in joules needed to warm `mass_kg` of ice from `initial_temp_c`
/// to 0 °C and then melt it
pub fn calculate_initial_energy(
    mass_kg: f32,
    initial_temp_c: f32,
    physics: &PhysicalConstants,
) -> f32 {
    let sensible = mass_kg * physics.specific_heat_ice * (0.0 - initial_temp_c);
    let latent = mass_kg * physics.latent_heat_fusion;
    sensible + latent
}

/// Melt model for one ice block
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeltModel {
    physics: PhysicalConstants,
    ice: IceConfig,
    /// Energy budget at construction (J)
    initial_total_energy: f32,
    /// Energy still required (J), never negative
    total_energy: f32,
    /// Energy delivered so far (J)
    accumulated_energy: f32,
    /// Heat flux computed on the last cycle (W), may be negative
    current_power: f32,
}

impl MeltModel {
    /// Create a model for the block described by `ice`, starting at
    /// `initial_temp_c`
    pub fn new(
        ice: &IceConfig,
        physics: &PhysicalConstants,
        initial_temp_c: f32,
    ) -> Result<Self, ModelError> {
        if !ice.mass_kg.is_finite() || ice.mass_kg <= 0.0 {
            return Err(ModelError::InvalidMass);
        }
        if !initial_temp_c.is_finite() || initial_temp_c > 0.0 {
            return Err(ModelError::InvalidTemperature);
        }

        let energy = calculate_initial_energy(ice.mass_kg, initial_temp_c, physics);

        Ok(Self {
            physics: *physics,
            ice: *ice,
            initial_total_energy: energy,
            total_energy: energy,
            accumulated_energy: 0.0,
            current_power: 0.0,
        })
    }

    /// Compute and store the heat flux into the block (W)
    ///
    /// # Arguments
    /// - `ambient_c`: air temperature
    /// - `surface_c`: ice surface temperature
    /// - `base_c`: base plate temperature
    pub fn calculate_heat_flux(&mut self, ambient_c: f32, surface_c: f32, base_c: f32) -> f32 {
        let area = self.ice.surface_area_m2;

        let convection =
            self.physics.convection_coeff * area * CONVECTION_SHARE * (ambient_c - surface_c);
        let conduction = self.physics.conduction_coeff * area * CONDUCTION_SHARE
            * (base_c - surface_c)
            / self.ice.thickness_m;

        self.current_power = convection + conduction;
        self.current_power
    }

    /// Integrate the current heat flux over `delta_s` seconds
    ///
    /// Non-positive or non-finite intervals are ignored. A negative flux
    /// (block losing heat) delivers nothing.
    pub fn update_energy(&mut self, delta_s: f32) {
        if !delta_s.is_finite() || delta_s <= 0.0 {
            return;
        }

        let transferred = self.current_power.max(0.0) * delta_s;
        self.total_energy = (self.total_energy - transferred).max(0.0);
        self.accumulated_energy += transferred;
    }

    /// Estimated seconds until fully melted at the current heat flux
    ///
    /// `None` when the block is not gaining heat.
    pub fn remaining_time(&self) -> Option<f32> {
        if self.current_power > 0.0 {
            Some(self.total_energy / self.current_power)
        } else {
            None
        }
    }

    /// Delivered share of the latent heat, percent in 0..=100
    pub fn melt_progress(&self) -> f32 {
        let latent = self.ice.mass_kg * self.physics.latent_heat_fusion;
        (self.accumulated_energy / latent * 100.0).clamp(0.0, 100.0)
    }

    /// True once the energy budget is exhausted
    pub fn is_theoretically_melted(&self) -> bool {
        self.total_energy <= 0.0
    }

    /// Energy still required (J)
    pub fn total_energy(&self) -> f32 {
        self.total_energy
    }

    /// Energy budget at construction (J)
    pub fn initial_total_energy(&self) -> f32 {
        self.initial_total_energy
    }

    /// Energy delivered so far (J)
    pub fn accumulated_energy(&self) -> f32 {
        self.accumulated_energy
    }

    /// Heat flux from the last `calculate_heat_flux` (W)
    pub fn current_power(&self) -> f32 {
        self.current_power
    }

    /// Ice mass (kg)
    pub fn ice_mass(&self) -> f32 {
        self.ice.mass_kg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reference_model() -> MeltModel {
        MeltModel::new(&IceConfig::default(), &PhysicalConstants::default(), -10.0).unwrap()
    }

    fn close(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn test_initial_energy() {
        let model = reference_model();
        // 0.5 * 2108 * 10 + 0.5 * 334000
        assert!(close(model.initial_total_energy(), 177_540.0, 0.5));
        assert_eq!(model.total_energy(), model.initial_total_energy());
        assert_eq!(model.accumulated_energy(), 0.0);
        assert_eq!(model.ice_mass(), 0.5);
    }

    #[test]
    fn test_initial_energy_at_zero_degrees_is_latent_only() {
        let physics = PhysicalConstants::default();
        assert!(close(calculate_initial_energy(0.5, 0.0, &physics), 167_000.0, 0.5));
    }

    #[test]
    fn test_reference_scenario() {
        let mut model = reference_model();

        let power = model.calculate_heat_flux(20.0, -2.0, 5.0);
        // convection 25 * 0.06 * 5/6 * 22 = 27.5
        // conduction 2.22 * 0.06 * 1/6 * 7 / 0.1 = 1.554
        assert!(close(power, 29.054, 1e-3));
        assert_eq!(model.current_power(), power);

        let remaining = model.remaining_time().unwrap();
        assert!(close(remaining, 6110.7, 1.0));
    }

    #[test]
    fn test_conduction_share_is_not_integer_division() {
        let mut model = reference_model();
        // No convection, only conduction through the base
        let power = model.calculate_heat_flux(0.0, 0.0, 10.0);
        assert!(close(power, 2.22 * 0.06 / 6.0 * 10.0 / 0.1, 1e-4));
        assert!(power > 0.0);
    }

    #[test]
    fn test_no_estimate_without_heat_gain() {
        let mut model = reference_model();
        assert_eq!(model.remaining_time(), None);

        model.calculate_heat_flux(-5.0, -2.0, -5.0);
        assert!(model.current_power() < 0.0);
        assert_eq!(model.remaining_time(), None);

        model.calculate_heat_flux(-2.0, -2.0, -2.0);
        assert_eq!(model.remaining_time(), None);
    }

    #[test]
    fn test_negative_power_delivers_nothing() {
        let mut model = reference_model();
        model.calculate_heat_flux(-5.0, -2.0, -5.0);
        model.update_energy(10.0);
        assert_eq!(model.total_energy(), model.initial_total_energy());
        assert_eq!(model.accumulated_energy(), 0.0);
    }

    #[test]
    fn test_bad_intervals_ignored() {
        let mut model = reference_model();
        model.calculate_heat_flux(20.0, -2.0, 5.0);
        model.update_energy(0.0);
        model.update_energy(-3.0);
        model.update_energy(f32::NAN);
        model.update_energy(f32::INFINITY);
        assert_eq!(model.accumulated_energy(), 0.0);
    }

    #[test]
    fn test_update_moves_energy() {
        let mut model = reference_model();
        model.calculate_heat_flux(20.0, -2.0, 5.0);
        model.update_energy(100.0);
        assert!(close(model.accumulated_energy(), 2905.4, 0.1));
        assert!(close(
            model.total_energy() + model.accumulated_energy(),
            model.initial_total_energy(),
            0.1
        ));
        // 2905.4 / 167000
        assert!(close(model.melt_progress(), 1.7398, 1e-3));
    }

    #[test]
    fn test_clamp_decouples_accumulator() {
        let mut model = reference_model();
        model.calculate_heat_flux(20.0, -2.0, 5.0);
        model.update_energy(10_000.0);

        assert_eq!(model.total_energy(), 0.0);
        assert!(model.is_theoretically_melted());
        assert_eq!(model.melt_progress(), 100.0);
        assert_eq!(model.remaining_time(), Some(0.0));

        let before = model.accumulated_energy();
        assert!(before > model.initial_total_energy());
        model.update_energy(1.0);
        assert!(model.accumulated_energy() > before);
        assert_eq!(model.total_energy(), 0.0);
        assert!(model.is_theoretically_melted());
    }

    #[test]
    fn test_constructor_rejects_bad_inputs() {
        let physics = PhysicalConstants::default();
        let mut ice = IceConfig::default();

        assert_eq!(
            MeltModel::new(&ice, &physics, 1.0).unwrap_err(),
            ModelError::InvalidTemperature
        );
        assert_eq!(
            MeltModel::new(&ice, &physics, f32::NAN).unwrap_err(),
            ModelError::InvalidTemperature
        );

        ice.mass_kg = 0.0;
        assert_eq!(
            MeltModel::new(&ice, &physics, -1.0).unwrap_err(),
            ModelError::InvalidMass
        );
        ice.mass_kg = -1.0;
        assert_eq!(
            MeltModel::new(&ice, &physics, -1.0).unwrap_err(),
            ModelError::InvalidMass
        );
    }

    fn cycle() -> impl Strategy<Value = (f32, f32, f32, f32)> {
        (-10.0f32..40.0, -20.0f32..0.0, -10.0f32..40.0, 0.0f32..2.0)
    }

    proptest! {
        #[test]
        fn prop_initial_energy_positive(mass in 0.01f32..5.0, t0 in -40.0f32..=0.0) {
            let energy = calculate_initial_energy(mass, t0, &PhysicalConstants::default());
            prop_assert!(energy > 0.0);
        }

        #[test]
        fn prop_energy_conserved(cycles in proptest::collection::vec(cycle(), 1..200)) {
            let mut model = reference_model();
            let initial = model.initial_total_energy();
            for (ambient, surface, base, dt) in cycles {
                model.calculate_heat_flux(ambient, surface, base);
                model.update_energy(dt);
                prop_assert!(model.total_energy() > 0.0);
                let sum = model.total_energy() + model.accumulated_energy();
                prop_assert!((sum - initial).abs() <= initial * 1e-4);
            }
        }

        #[test]
        fn prop_progress_monotone_and_bounded(cycles in proptest::collection::vec(cycle(), 1..200)) {
            let ice = IceConfig { mass_kg: 0.01, ..IceConfig::default() };
            let mut model = MeltModel::new(&ice, &PhysicalConstants::default(), -5.0).unwrap();
            let mut last = model.melt_progress();
            let mut melted = false;
            for (ambient, surface, base, dt) in cycles {
                model.calculate_heat_flux(ambient, surface, base);
                model.update_energy(dt * 50.0);
                let progress = model.melt_progress();
                prop_assert!((0.0..=100.0).contains(&progress));
                prop_assert!(progress >= last);
                last = progress;

                // Once melted, always melted
                if melted {
                    prop_assert!(model.is_theoretically_melted());
                }
                melted = model.is_theoretically_melted();
            }
        }
    }
}
