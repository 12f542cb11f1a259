//! Sensor hub
//!
//! Owns the four temperature probes and the range finder. Probe failures
//! never propagate as errors: the affected value is replaced by a sentinel
//! and the reading is flagged invalid, so the polling loop always gets a
//! complete snapshot.

use crate::config::{BoxConfig, ContainerConfig, IceConfig};
use crate::traits::{DistanceSensor, SensorError, TemperatureSensor};

/// Temperature reported for a probe that did not answer
pub const DISCONNECTED_C: f32 = -127.0;

/// Water level reported when the range finder reading is unusable
pub const INVALID_LEVEL_M: f32 = -1.0;

/// Probe positions, in wiring order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Probe {
    Ambient,
    Surface,
    Inner,
    Base,
}

impl Probe {
    /// All probes in wiring order
    pub const ALL: [Probe; 4] = [Probe::Ambient, Probe::Surface, Probe::Inner, Probe::Base];

    pub fn name(&self) -> &'static str {
        match self {
            Probe::Ambient => "ambient",
            Probe::Surface => "surface",
            Probe::Inner => "inner",
            Probe::Base => "base",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Temperatures from one sweep of all probes
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureReadings {
    pub ambient_c: f32,
    pub surface_c: f32,
    pub inner_c: f32,
    pub base_c: f32,
    /// Every probe answered
    pub is_valid: bool,
    /// First probe that failed, for diagnostics
    pub fault: Option<(Probe, SensorError)>,
}

impl TemperatureReadings {
    /// Reading of one probe
    pub fn get(&self, probe: Probe) -> f32 {
        match probe {
            Probe::Ambient => self.ambient_c,
            Probe::Surface => self.surface_c,
            Probe::Inner => self.inner_c,
            Probe::Base => self.base_c,
        }
    }

    fn from_values(values: [f32; 4], fault: Option<(Probe, SensorError)>) -> Self {
        Self {
            ambient_c: values[0],
            surface_c: values[1],
            inner_c: values[2],
            base_c: values[3],
            is_valid: fault.is_none(),
            fault,
        }
    }
}

/// Meltwater level from one range finder shot
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaterLevelData {
    /// Level above the container floor (m), or [`INVALID_LEVEL_M`]
    pub level_m: f32,
    pub is_valid: bool,
    /// Why the reading is invalid, if it is
    pub fault: Option<SensorError>,
}

impl WaterLevelData {
    fn invalid(fault: SensorError) -> Self {
        Self {
            level_m: INVALID_LEVEL_M,
            is_valid: false,
            fault: Some(fault),
        }
    }
}

/// True if `data` shows enough water for the block to have fully melted
///
/// The expected level is the block thickness scaled by the ice/water
/// density ratio; the container threshold allows for measurement slack.
pub fn water_confirms_melt(
    data: &WaterLevelData,
    ice: &IceConfig,
    container: &ContainerConfig,
) -> bool {
    data.is_valid
        && data.level_m >= ice.expected_water_level_m() * container.water_level_threshold
}

/// Owner of every sensor on the box
pub struct SensorHub<T, D> {
    probes: [T; 4],
    range: D,
    ice: IceConfig,
    container: ContainerConfig,
}

impl<T: TemperatureSensor, D: DistanceSensor> SensorHub<T, D> {
    /// Create a hub; `probes` are in [`Probe::ALL`] order
    pub fn new(probes: [T; 4], range: D, config: &BoxConfig) -> Self {
        Self {
            probes,
            range,
            ice: config.ice,
            container: config.container,
        }
    }

    /// Read all four probes
    ///
    /// Conversions are started on every probe before any is read, so the
    /// conversion delays overlap.
    pub fn read_temperatures(&mut self) -> TemperatureReadings {
        let mut started = [Ok(()); 4];
        for (probe, result) in self.probes.iter_mut().zip(started.iter_mut()) {
            *result = probe.start_conversion();
        }

        let mut values = [DISCONNECTED_C; 4];
        let mut fault = None;

        for probe in Probe::ALL {
            let i = probe.index();
            let reading = started[i].and_then(|()| self.probes[i].read_celsius());
            let error = match reading {
                Ok(c) if c.is_finite() && c != DISCONNECTED_C => {
                    values[i] = c;
                    continue;
                }
                Ok(_) => SensorError::Disconnected,
                Err(e) => e,
            };
            if fault.is_none() {
                fault = Some((probe, error));
            }
        }

        TemperatureReadings::from_values(values, fault)
    }

    /// Measure the water level
    ///
    /// Distances below zero or beyond the container floor are invalid.
    pub fn read_water_level(&mut self) -> WaterLevelData {
        let distance = match self.range.read_distance_m() {
            Ok(d) => d,
            Err(e) => return WaterLevelData::invalid(e),
        };

        if !distance.is_finite() || distance < 0.0 || distance > self.container.height_m {
            return WaterLevelData::invalid(SensorError::OutOfRange);
        }

        WaterLevelData {
            level_m: self.container.height_m - distance,
            is_valid: true,
            fault: None,
        }
    }

    /// Water-level confirmation of a full melt
    pub fn water_confirms_melt(&self, data: &WaterLevelData) -> bool {
        water_confirms_melt(data, &self.ice, &self.container)
    }

    /// Direct access to one probe
    pub fn probe_mut(&mut self, probe: Probe) -> &mut T {
        &mut self.probes[probe.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProbe {
        result: Result<f32, SensorError>,
        conversions: u32,
    }

    impl FixedProbe {
        fn ok(c: f32) -> Self {
            Self {
                result: Ok(c),
                conversions: 0,
            }
        }

        fn err(e: SensorError) -> Self {
            Self {
                result: Err(e),
                conversions: 0,
            }
        }
    }

    impl TemperatureSensor for FixedProbe {
        fn start_conversion(&mut self) -> Result<(), SensorError> {
            self.conversions += 1;
            self.result.map(|_| ())
        }

        fn read_celsius(&mut self) -> Result<f32, SensorError> {
            self.result
        }
    }

    struct FixedRange(Result<f32, SensorError>);

    impl DistanceSensor for FixedRange {
        fn read_distance_m(&mut self) -> Result<f32, SensorError> {
            self.0
        }
    }

    fn hub(
        probes: [FixedProbe; 4],
        distance: Result<f32, SensorError>,
    ) -> SensorHub<FixedProbe, FixedRange> {
        SensorHub::new(probes, FixedRange(distance), &BoxConfig::default())
    }

    fn healthy() -> [FixedProbe; 4] {
        [
            FixedProbe::ok(20.0),
            FixedProbe::ok(-2.0),
            FixedProbe::ok(-8.5),
            FixedProbe::ok(5.0),
        ]
    }

    #[test]
    fn test_all_probes_valid() {
        let mut hub = hub(healthy(), Ok(0.1));
        let temps = hub.read_temperatures();
        assert!(temps.is_valid);
        assert_eq!(temps.fault, None);
        assert_eq!(temps.ambient_c, 20.0);
        assert_eq!(temps.surface_c, -2.0);
        assert_eq!(temps.get(Probe::Inner), -8.5);
        assert_eq!(temps.base_c, 5.0);

        for probe in Probe::ALL {
            assert_eq!(hub.probe_mut(probe).conversions, 1);
        }
    }

    #[test]
    fn test_failed_probe_uses_sentinel() {
        let mut probes = healthy();
        probes[2] = FixedProbe::err(SensorError::CrcMismatch);
        let mut hub = hub(probes, Ok(0.1));

        let temps = hub.read_temperatures();
        assert!(!temps.is_valid);
        assert_eq!(temps.inner_c, DISCONNECTED_C);
        assert_eq!(temps.ambient_c, 20.0);
        assert_eq!(temps.fault, Some((Probe::Inner, SensorError::CrcMismatch)));
    }

    #[test]
    fn test_sentinel_value_from_driver_is_invalid() {
        let mut probes = healthy();
        probes[0] = FixedProbe::ok(DISCONNECTED_C);
        let mut hub = hub(probes, Ok(0.1));

        let temps = hub.read_temperatures();
        assert!(!temps.is_valid);
        assert_eq!(temps.fault, Some((Probe::Ambient, SensorError::Disconnected)));
    }

    #[test]
    fn test_first_fault_is_reported() {
        let mut probes = healthy();
        probes[1] = FixedProbe::err(SensorError::Timeout);
        probes[3] = FixedProbe::err(SensorError::Disconnected);
        let mut hub = hub(probes, Ok(0.1));

        let temps = hub.read_temperatures();
        assert_eq!(temps.fault, Some((Probe::Surface, SensorError::Timeout)));
        assert_eq!(temps.base_c, DISCONNECTED_C);
    }

    #[test]
    fn test_water_level_from_distance() {
        let mut hub = hub(healthy(), Ok(0.05));
        let water = hub.read_water_level();
        assert!(water.is_valid);
        assert!((water.level_m - 0.10).abs() < 1e-6);
    }

    #[test]
    fn test_water_level_bounds() {
        // Beyond the floor
        let water = hub(healthy(), Ok(0.2)).read_water_level();
        assert!(!water.is_valid);
        assert_eq!(water.level_m, INVALID_LEVEL_M);
        assert_eq!(water.fault, Some(SensorError::OutOfRange));

        // Exactly at the floor: empty container
        let water = hub(healthy(), Ok(0.15)).read_water_level();
        assert!(water.is_valid);
        assert_eq!(water.level_m, 0.0);

        let water = hub(healthy(), Ok(-0.01)).read_water_level();
        assert!(!water.is_valid);

        let water = hub(healthy(), Err(SensorError::Timeout)).read_water_level();
        assert!(!water.is_valid);
        assert_eq!(water.fault, Some(SensorError::Timeout));
    }

    #[test]
    fn test_water_confirmation_threshold() {
        let hub = hub(healthy(), Ok(0.0));
        // 0.1 * 0.917 * 0.95 = 0.087115
        let level = |level_m| WaterLevelData {
            level_m,
            is_valid: true,
            fault: None,
        };
        assert!(hub.water_confirms_melt(&level(0.0872)));
        assert!(!hub.water_confirms_melt(&level(0.0870)));

        let invalid = WaterLevelData::invalid(SensorError::Timeout);
        assert!(!hub.water_confirms_melt(&invalid));
    }
}
