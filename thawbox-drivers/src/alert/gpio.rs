//! GPIO alert outputs and reset button
//!
//! Buzzer and indicator are plain GPIO outputs, directly or through a
//! transistor. Either can be wired active-low.

use thawbox_core::config::PinConfig;
use thawbox_core::traits::{Annunciator, ResetInput};
use thawbox_hal::gpio::ActiveLevel;
use thawbox_hal::{InputPin, OutputPin};

fn level_of(pin: &PinConfig) -> ActiveLevel {
    if pin.inverted {
        ActiveLevel::Low
    } else {
        ActiveLevel::High
    }
}

/// Buzzer and status indicator on two GPIO outputs
pub struct GpioAnnunciator<B, L> {
    buzzer: B,
    buzzer_level: ActiveLevel,
    indicator: L,
    indicator_level: ActiveLevel,
}

impl<B: OutputPin, L: OutputPin> GpioAnnunciator<B, L> {
    /// Create the outputs; both start switched off
    pub fn new(
        buzzer: B,
        buzzer_level: ActiveLevel,
        indicator: L,
        indicator_level: ActiveLevel,
    ) -> Self {
        let mut outputs = Self {
            buzzer,
            buzzer_level,
            indicator,
            indicator_level,
        };
        outputs.all_off();
        outputs
    }

    /// Create the outputs with polarity taken from the pin configuration
    pub fn from_config(
        buzzer: B,
        buzzer_pin: &PinConfig,
        indicator: L,
        indicator_pin: &PinConfig,
    ) -> Self {
        Self::new(
            buzzer,
            level_of(buzzer_pin),
            indicator,
            level_of(indicator_pin),
        )
    }

    /// Whether the buzzer is currently sounding
    pub fn buzzer_on(&self) -> bool {
        self.buzzer_level.is_asserted(self.buzzer.is_set_high())
    }

    /// Whether the indicator is currently lit
    pub fn indicator_on(&self) -> bool {
        self.indicator_level.is_asserted(self.indicator.is_set_high())
    }
}

impl<B: OutputPin, L: OutputPin> Annunciator for GpioAnnunciator<B, L> {
    fn set_buzzer(&mut self, on: bool) {
        self.buzzer.set_state(self.buzzer_level.level_for(on));
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator.set_state(self.indicator_level.level_for(on));
    }
}

/// Reset push-button on a GPIO input
pub struct GpioResetButton<P> {
    pin: P,
    level: ActiveLevel,
}

impl<P: InputPin> GpioResetButton<P> {
    pub fn new(pin: P, level: ActiveLevel) -> Self {
        Self { pin, level }
    }

    /// Button to ground with a pull-up
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    pub fn from_config(pin: P, config: &PinConfig) -> Self {
        Self::new(pin, level_of(config))
    }
}

impl<P: InputPin> ResetInput for GpioResetButton<P> {
    fn is_asserted(&mut self) -> bool {
        self.level.is_asserted(self.pin.is_high())
    }
}
