//! Alert state machine
//!
//! ```text
//!           activate()
//!   Idle ───────────────► Active ──┐ update(): toggle buzzer + indicator
//!    ▲                       │  ◄──┘ every `interval_ms`
//!    └───────────────────────┘
//!     reset asserted in update(), or deactivate()
//! ```
//!
//! On activation the indicator lights steadily; the first `update` starts
//! the buzzer, after which buzzer and indicator blink together.

use crate::traits::{Annunciator, ResetInput};

/// Alert state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertState {
    #[default]
    Idle,
    Active,
}

/// What one `update` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertUpdate {
    /// Alert not active, nothing driven
    Idle,
    /// Active, interval not yet elapsed
    Holding,
    /// Active, outputs toggled
    Toggled,
    /// Reset seen: alert went idle and outputs are off
    Silenced,
}

/// Buzzer and indicator controller with operator reset
pub struct AlertController<A: Annunciator, R: ResetInput> {
    annunciator: A,
    reset: R,
    state: AlertState,
    interval_ms: u64,
    /// Time of the last toggle; `None` until the first update after activation
    last_toggle_ms: Option<u64>,
    buzzer_on: bool,
    indicator_on: bool,
}

impl<A: Annunciator, R: ResetInput> AlertController<A, R> {
    /// Create an idle controller with both outputs off
    pub fn new(mut annunciator: A, reset: R, interval_ms: u64) -> Self {
        annunciator.all_off();
        Self {
            annunciator,
            reset,
            state: AlertState::Idle,
            interval_ms,
            last_toggle_ms: None,
            buzzer_on: false,
            indicator_on: false,
        }
    }

    /// Raise the alert; no effect if already active
    pub fn activate(&mut self) {
        if self.state == AlertState::Active {
            return;
        }

        self.state = AlertState::Active;
        self.last_toggle_ms = None;
        self.set_outputs(false, true);
    }

    /// Activate and service the alert in one step
    ///
    /// The first buzzer pulse starts in this call, so nothing the caller
    /// does afterwards (uplink I/O) delays the local signal.
    pub fn raise(&mut self, now_ms: u64) -> AlertUpdate {
        self.activate();
        self.update(now_ms)
    }

    /// Service the alert once per loop iteration
    pub fn update(&mut self, now_ms: u64) -> AlertUpdate {
        if self.state == AlertState::Idle {
            return AlertUpdate::Idle;
        }

        if self.reset.is_asserted() {
            self.deactivate();
            return AlertUpdate::Silenced;
        }

        let due = match self.last_toggle_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.interval_ms,
        };
        if !due {
            return AlertUpdate::Holding;
        }

        let on = !self.buzzer_on;
        self.set_outputs(on, on);
        self.last_toggle_ms = Some(now_ms);
        AlertUpdate::Toggled
    }

    /// Go idle and switch both outputs off
    pub fn deactivate(&mut self) {
        self.state = AlertState::Idle;
        self.last_toggle_ms = None;
        self.buzzer_on = false;
        self.indicator_on = false;
        self.annunciator.all_off();
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == AlertState::Active
    }

    /// Last commanded buzzer level
    pub fn buzzer_on(&self) -> bool {
        self.buzzer_on
    }

    /// Last commanded indicator level
    pub fn indicator_on(&self) -> bool {
        self.indicator_on
    }

    /// Poll the reset input directly (used while idle)
    pub fn reset_asserted(&mut self) -> bool {
        self.reset.is_asserted()
    }

    fn set_outputs(&mut self, buzzer: bool, indicator: bool) {
        self.buzzer_on = buzzer;
        self.indicator_on = indicator;
        self.annunciator.set_buzzer(buzzer);
        self.annunciator.set_indicator(indicator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[derive(Default)]
    struct Outputs {
        buzzer: Cell<bool>,
        indicator: Cell<bool>,
        writes: Cell<u32>,
    }

    struct MockAnnunciator<'a>(&'a Outputs);

    impl Annunciator for MockAnnunciator<'_> {
        fn set_buzzer(&mut self, on: bool) {
            self.0.buzzer.set(on);
            self.0.writes.set(self.0.writes.get() + 1);
        }

        fn set_indicator(&mut self, on: bool) {
            self.0.indicator.set(on);
            self.0.writes.set(self.0.writes.get() + 1);
        }
    }

    struct MockReset<'a>(&'a Cell<bool>);

    impl ResetInput for MockReset<'_> {
        fn is_asserted(&mut self) -> bool {
            self.0.get()
        }
    }

    fn controller<'a>(
        outputs: &'a Outputs,
        pressed: &'a Cell<bool>,
    ) -> AlertController<MockAnnunciator<'a>, MockReset<'a>> {
        AlertController::new(MockAnnunciator(outputs), MockReset(pressed), 1000)
    }

    #[test]
    fn test_starts_idle_with_outputs_off() {
        let outputs = Outputs::default();
        outputs.buzzer.set(true);
        outputs.indicator.set(true);
        let pressed = Cell::new(false);

        let mut alert = controller(&outputs, &pressed);
        assert_eq!(alert.state(), AlertState::Idle);
        assert!(!outputs.buzzer.get());
        assert!(!outputs.indicator.get());

        let writes = outputs.writes.get();
        assert_eq!(alert.update(5000), AlertUpdate::Idle);
        assert_eq!(outputs.writes.get(), writes);
    }

    #[test]
    fn test_activate_lights_indicator() {
        let outputs = Outputs::default();
        let pressed = Cell::new(false);
        let mut alert = controller(&outputs, &pressed);

        alert.activate();
        assert!(alert.is_active());
        assert!(alert.indicator_on());
        assert!(!alert.buzzer_on());
        assert!(outputs.indicator.get());
        assert!(!outputs.buzzer.get());
    }

    #[test]
    fn test_raise_sounds_buzzer_immediately() {
        let outputs = Outputs::default();
        let pressed = Cell::new(false);
        let mut alert = controller(&outputs, &pressed);

        assert_eq!(alert.raise(42_000), AlertUpdate::Toggled);
        assert!(alert.is_active());
        assert!(outputs.buzzer.get());
        assert!(outputs.indicator.get());

        // Same cycle: the loop's regular update must not toggle again
        assert_eq!(alert.update(42_000), AlertUpdate::Holding);
        assert!(outputs.buzzer.get());
    }

    #[test]
    fn test_raise_with_reset_held_silences() {
        let outputs = Outputs::default();
        let pressed = Cell::new(true);
        let mut alert = controller(&outputs, &pressed);

        assert_eq!(alert.raise(0), AlertUpdate::Silenced);
        assert!(!alert.is_active());
        assert!(!outputs.buzzer.get());
    }

    #[test]
    fn test_toggles_on_interval() {
        let outputs = Outputs::default();
        let pressed = Cell::new(false);
        let mut alert = controller(&outputs, &pressed);
        alert.activate();

        assert_eq!(alert.update(10_000), AlertUpdate::Toggled);
        assert!(outputs.buzzer.get());
        assert!(outputs.indicator.get());

        assert_eq!(alert.update(10_500), AlertUpdate::Holding);
        assert!(outputs.buzzer.get());

        assert_eq!(alert.update(11_000), AlertUpdate::Toggled);
        assert!(!outputs.buzzer.get());
        assert!(!outputs.indicator.get());

        assert_eq!(alert.update(12_000), AlertUpdate::Toggled);
        assert!(outputs.buzzer.get());
    }

    #[test]
    fn test_clock_going_backwards_holds() {
        let outputs = Outputs::default();
        let pressed = Cell::new(false);
        let mut alert = controller(&outputs, &pressed);
        alert.activate();
        alert.update(10_000);

        assert_eq!(alert.update(9_000), AlertUpdate::Holding);
    }

    #[test]
    fn test_reset_silences_in_same_update() {
        let outputs = Outputs::default();
        let pressed = Cell::new(false);
        let mut alert = controller(&outputs, &pressed);
        alert.activate();
        alert.update(1000);
        assert!(outputs.buzzer.get());

        pressed.set(true);
        assert_eq!(alert.update(1200), AlertUpdate::Silenced);
        assert_eq!(alert.state(), AlertState::Idle);
        assert!(!outputs.buzzer.get());
        assert!(!outputs.indicator.get());
        assert!(!alert.buzzer_on());
        assert!(!alert.indicator_on());
    }

    #[test]
    fn test_reset_while_idle_does_nothing() {
        let outputs = Outputs::default();
        let pressed = Cell::new(true);
        let mut alert = controller(&outputs, &pressed);
        assert_eq!(alert.update(0), AlertUpdate::Idle);
        assert!(alert.reset_asserted());
    }

    #[test]
    fn test_deactivate_forces_outputs_off() {
        let outputs = Outputs::default();
        let pressed = Cell::new(false);
        let mut alert = controller(&outputs, &pressed);
        alert.activate();
        alert.update(0);

        alert.deactivate();
        assert!(!alert.is_active());
        assert!(!outputs.buzzer.get());
        assert!(!outputs.indicator.get());

        // Deactivating an idle alert is harmless
        alert.deactivate();
        assert_eq!(alert.state(), AlertState::Idle);
    }

    #[test]
    fn test_double_activate_keeps_phase() {
        let outputs = Outputs::default();
        let pressed = Cell::new(false);
        let mut alert = controller(&outputs, &pressed);
        alert.activate();
        alert.update(0);
        assert!(alert.buzzer_on());

        alert.activate();
        assert!(alert.buzzer_on());
        assert_eq!(alert.update(500), AlertUpdate::Holding);
    }
}
