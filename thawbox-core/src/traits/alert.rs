//! Local alert outputs and the reset input

/// Audible and visual alert outputs
pub trait Annunciator {
    /// Switch the buzzer on or off
    fn set_buzzer(&mut self, on: bool);

    /// Switch the status indicator on or off
    fn set_indicator(&mut self, on: bool);

    /// Force both outputs off
    fn all_off(&mut self) {
        self.set_buzzer(false);
        self.set_indicator(false);
    }
}

/// Operator reset signal
pub trait ResetInput {
    /// True while the reset is requested (e.g. button held)
    ///
    /// Implementations hide the electrical polarity.
    fn is_asserted(&mut self) -> bool;
}
