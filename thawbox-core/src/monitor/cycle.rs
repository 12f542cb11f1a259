//! One polling cycle
//!
//! Each cycle:
//! 1. With valid temperatures, recompute the heat flux and integrate it
//!    over the time since the previous integration. Invalid temperatures
//!    leave the model untouched.
//! 2. Append a snapshot to the measurement log.
//! 3. Evaluate both completion signals (model and water level).
//! 4. Decide whether to raise the alert and whether an upload is due.
//!
//! The alert is raised the first time either completion signal is seen
//! and never again for the same run, so a silenced alert stays silent.

use crate::config::{BoxConfig, ContainerConfig, IceConfig, PhysicalConstants};
use crate::log::{MeasurementLog, MeasurementPoint, LOG_CAPACITY};
use crate::model::{MeltModel, ModelError};
use crate::sensors::{water_confirms_melt, TemperatureReadings, WaterLevelData, DISCONNECTED_C};

/// Both completion signals for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeltStatus {
    /// Energy budget exhausted
    pub model_melted: bool,
    /// Meltwater level reached the expected height
    pub water_confirmed: bool,
}

impl MeltStatus {
    /// Either signal reports a full melt
    pub fn is_complete(&self) -> bool {
        self.model_melted || self.water_confirmed
    }

    /// Model and water level tell the same story
    pub fn signals_agree(&self) -> bool {
        self.model_melted == self.water_confirmed
    }
}

/// Outcome of one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    /// Snapshot appended to the log
    pub point: MeasurementPoint,
    pub status: MeltStatus,
    /// Raise the alert now
    pub trigger_alert: bool,
    /// Telemetry upload interval has elapsed
    pub upload_due: bool,
}

/// Owner of the melt model and measurement log for one run
#[derive(Debug, Clone)]
pub struct Monitor<const C: usize = LOG_CAPACITY> {
    model: MeltModel,
    log: MeasurementLog<C>,
    physics: PhysicalConstants,
    ice: IceConfig,
    container: ContainerConfig,
    upload_interval_ms: u64,
    /// Time of the last energy integration; `None` until the first valid cycle
    last_energy_update_ms: Option<u64>,
    last_upload_ms: Option<u64>,
    /// Alert already raised this run
    alert_latched: bool,
    status: MeltStatus,
}

impl<const C: usize> Monitor<C> {
    /// Start a run with the block at `initial_temp_c`
    pub fn new(config: &BoxConfig, initial_temp_c: f32) -> Result<Self, ModelError> {
        Ok(Self {
            model: MeltModel::new(&config.ice, &config.physics, initial_temp_c)?,
            log: MeasurementLog::new(),
            physics: config.physics,
            ice: config.ice,
            container: config.container,
            upload_interval_ms: config.timing.upload_interval_ms,
            last_energy_update_ms: None,
            last_upload_ms: None,
            alert_latched: false,
            status: MeltStatus::default(),
        })
    }

    /// Pick the starting ice temperature from a first probe sweep
    ///
    /// Uses the inner probe when it answered (capped at 0 °C), otherwise
    /// `fallback_c`.
    pub fn starting_temperature(temps: &TemperatureReadings, fallback_c: f32) -> f32 {
        let inner = temps.inner_c;
        if inner.is_finite() && inner != DISCONNECTED_C {
            inner.min(0.0)
        } else {
            fallback_c.min(0.0)
        }
    }

    /// Run one polling cycle
    pub fn cycle(
        &mut self,
        now_ms: u64,
        temps: &TemperatureReadings,
        water: &WaterLevelData,
    ) -> CycleReport {
        let remaining_time_s = if temps.is_valid {
            self.model
                .calculate_heat_flux(temps.ambient_c, temps.surface_c, temps.base_c);
            self.integrate(now_ms);
            self.model.remaining_time()
        } else {
            None
        };

        let point = MeasurementPoint {
            timestamp_ms: now_ms,
            ambient_c: temps.ambient_c,
            surface_c: temps.surface_c,
            inner_c: temps.inner_c,
            base_c: temps.base_c,
            water_level_m: water.level_m,
            melt_progress: self.model.melt_progress(),
            remaining_time_s,
            is_valid: temps.is_valid && water.is_valid,
        };
        self.log.append(point);

        self.status = MeltStatus {
            model_melted: self.model.is_theoretically_melted(),
            water_confirmed: water_confirms_melt(water, &self.ice, &self.container),
        };

        let trigger_alert = self.status.is_complete() && !self.alert_latched;
        if trigger_alert {
            self.alert_latched = true;
        }

        let upload_due = match self.last_upload_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.upload_interval_ms,
        };

        CycleReport {
            point,
            status: self.status,
            trigger_alert,
            upload_due,
        }
    }

    /// Record an upload attempt at `now_ms`
    ///
    /// Failed attempts count too, so an offline box retries once per
    /// interval rather than every cycle.
    pub fn mark_uploaded(&mut self, now_ms: u64) {
        self.last_upload_ms = Some(now_ms);
    }

    /// Begin a new run with a fresh block
    ///
    /// The log is cleared and the alert can fire again. The upload cadence
    /// is kept.
    pub fn restart(&mut self, initial_temp_c: f32) -> Result<(), ModelError> {
        self.model = MeltModel::new(&self.ice, &self.physics, initial_temp_c)?;
        self.log.clear();
        self.last_energy_update_ms = None;
        self.alert_latched = false;
        self.status = MeltStatus::default();
        Ok(())
    }

    pub fn model(&self) -> &MeltModel {
        &self.model
    }

    pub fn log(&self) -> &MeasurementLog<C> {
        &self.log
    }

    /// Completion signals from the last cycle
    pub fn status(&self) -> MeltStatus {
        self.status
    }

    /// True once the alert has been raised this run
    pub fn alert_latched(&self) -> bool {
        self.alert_latched
    }

    fn integrate(&mut self, now_ms: u64) {
        if let Some(elapsed_ms) = self
            .last_energy_update_ms
            .and_then(|last| now_ms.checked_sub(last))
        {
            self.model.update_energy(elapsed_ms as f32 / 1000.0);
        }
        self.last_energy_update_ms = Some(now_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::INVALID_LEVEL_M;
    use crate::traits::SensorError;

    fn temps(ambient: f32, surface: f32, inner: f32, base: f32) -> TemperatureReadings {
        TemperatureReadings {
            ambient_c: ambient,
            surface_c: surface,
            inner_c: inner,
            base_c: base,
            is_valid: true,
            fault: None,
        }
    }

    fn reference_temps() -> TemperatureReadings {
        temps(20.0, -2.0, -8.0, 5.0)
    }

    fn disconnected() -> TemperatureReadings {
        TemperatureReadings {
            surface_c: DISCONNECTED_C,
            is_valid: false,
            fault: Some((crate::sensors::Probe::Surface, SensorError::Disconnected)),
            ..reference_temps()
        }
    }

    fn water(level_m: f32) -> WaterLevelData {
        WaterLevelData {
            level_m,
            is_valid: true,
            fault: None,
        }
    }

    fn no_water() -> WaterLevelData {
        WaterLevelData {
            level_m: INVALID_LEVEL_M,
            is_valid: false,
            fault: Some(SensorError::Timeout),
        }
    }

    fn monitor() -> Monitor<16> {
        Monitor::new(&BoxConfig::default(), -10.0).unwrap()
    }

    #[test]
    fn test_first_cycle_seeds_clock() {
        let mut m = monitor();
        let report = m.cycle(5_000, &reference_temps(), &water(0.01));

        assert_eq!(m.model().accumulated_energy(), 0.0);
        assert!((m.model().current_power() - 29.054).abs() < 1e-3);
        let remaining = report.point.remaining_time_s.unwrap();
        assert!((remaining - 6110.7).abs() < 1.0);
        assert!(report.point.is_valid);
        assert_eq!(m.log().count(), 1);
    }

    #[test]
    fn test_integrates_elapsed_time() {
        let mut m = monitor();
        m.cycle(0, &reference_temps(), &water(0.01));
        m.cycle(500, &reference_temps(), &water(0.01));
        m.cycle(1_000, &reference_temps(), &water(0.01));

        // 29.054 W for 1 s
        assert!((m.model().accumulated_energy() - 29.054).abs() < 1e-2);
        assert_eq!(m.log().count(), 3);
    }

    #[test]
    fn test_invalid_temperatures_leave_model_untouched() {
        let mut m = monitor();
        m.cycle(0, &reference_temps(), &water(0.01));
        let before = m.model().clone();

        let report = m.cycle(500, &disconnected(), &water(0.01));
        assert_eq!(m.model(), &before);
        assert_eq!(report.point.remaining_time_s, None);
        assert!(!report.point.is_valid);
        assert_eq!(report.point.surface_c, DISCONNECTED_C);
        assert_eq!(m.log().count(), 2);
    }

    #[test]
    fn test_invalid_water_marks_point_invalid() {
        let mut m = monitor();
        let report = m.cycle(0, &reference_temps(), &no_water());
        assert!(!report.point.is_valid);
        assert_eq!(report.point.water_level_m, INVALID_LEVEL_M);
        // Model still advances on valid temperatures
        assert!(report.point.remaining_time_s.is_some());
        assert!(!report.status.water_confirmed);
    }

    #[test]
    fn test_clock_regression_integrates_nothing() {
        let mut m = monitor();
        m.cycle(10_000, &reference_temps(), &water(0.01));
        m.cycle(9_000, &reference_temps(), &water(0.01));
        assert_eq!(m.model().accumulated_energy(), 0.0);
    }

    #[test]
    fn test_model_completion_triggers_alert_once() {
        let mut m = monitor();
        m.cycle(0, &reference_temps(), &water(0.01));

        // ~6111 s of heating melts the block
        let report = m.cycle(7_000_000, &reference_temps(), &water(0.01));
        assert!(report.status.model_melted);
        assert!(!report.status.water_confirmed);
        assert!(!report.status.signals_agree());
        assert!(report.trigger_alert);
        assert_eq!(report.point.melt_progress, 100.0);
        assert_eq!(report.point.remaining_time_s, Some(0.0));

        let report = m.cycle(7_000_500, &reference_temps(), &water(0.01));
        assert!(report.status.is_complete());
        assert!(!report.trigger_alert);
        assert!(m.alert_latched());
    }

    #[test]
    fn test_water_confirmation_triggers_alert() {
        let mut m = monitor();
        let report = m.cycle(0, &reference_temps(), &water(0.09));
        assert!(!report.status.model_melted);
        assert!(report.status.water_confirmed);
        assert!(report.trigger_alert);

        // Flickering level does not re-raise
        m.cycle(500, &reference_temps(), &water(0.05));
        let report = m.cycle(1_000, &reference_temps(), &water(0.09));
        assert!(!report.trigger_alert);
    }

    #[test]
    fn test_upload_cadence() {
        let mut m = monitor();
        let interval = BoxConfig::default().timing.upload_interval_ms;

        let report = m.cycle(0, &reference_temps(), &water(0.01));
        assert!(report.upload_due);
        m.mark_uploaded(0);

        let report = m.cycle(interval - 1, &reference_temps(), &water(0.01));
        assert!(!report.upload_due);

        let report = m.cycle(interval, &reference_temps(), &water(0.01));
        assert!(report.upload_due);
    }

    #[test]
    fn test_log_evicts_oldest() {
        let mut m = monitor();
        for i in 0..20u64 {
            m.cycle(i * 500, &reference_temps(), &water(0.01));
        }
        assert_eq!(m.log().count(), 16);
        assert_eq!(m.log().get(0).unwrap().timestamp_ms, 4 * 500);
    }

    #[test]
    fn test_restart_resets_run() {
        let mut m = monitor();
        m.cycle(0, &reference_temps(), &water(0.09));
        m.mark_uploaded(0);
        assert!(m.alert_latched());

        m.restart(-5.0).unwrap();
        assert!(m.log().is_empty());
        assert!(!m.alert_latched());
        assert_eq!(m.model().accumulated_energy(), 0.0);
        // 0.5 * 2108 * 5 + 0.5 * 334000
        assert!((m.model().initial_total_energy() - 172_270.0).abs() < 0.5);

        let report = m.cycle(100, &reference_temps(), &water(0.09));
        assert!(report.trigger_alert);
        // Upload cadence survives the restart
        assert!(!report.upload_due);

        assert_eq!(m.restart(3.0), Err(ModelError::InvalidTemperature));
    }

    #[test]
    fn test_starting_temperature() {
        let fallback = -10.0;
        assert_eq!(
            Monitor::<16>::starting_temperature(&reference_temps(), fallback),
            -8.0
        );
        assert_eq!(
            Monitor::<16>::starting_temperature(&temps(20.0, 0.0, 0.4, 5.0), fallback),
            0.0
        );

        let mut missing = reference_temps();
        missing.inner_c = DISCONNECTED_C;
        missing.is_valid = false;
        assert_eq!(Monitor::<16>::starting_temperature(&missing, fallback), -10.0);
    }
}
