//! GPIO pin abstractions
//!
//! Digital outputs drive the buzzer and status indicator; digital inputs
//! read the reset button. Polarity is handled one level up with
//! [`ActiveLevel`] so the pin traits stay electrical.

/// Digital output pin
pub trait OutputPin {
    /// Drive the pin high (logic 1)
    fn set_high(&mut self);

    /// Drive the pin low (logic 0)
    fn set_low(&mut self);

    /// Drive the pin to a specific electrical level
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Which electrical level means "asserted"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveLevel {
    /// Asserted when the pin is high
    #[default]
    High,
    /// Asserted when the pin is low (pull-up wiring)
    Low,
}

impl ActiveLevel {
    /// Electrical level that corresponds to the given logical state
    pub fn level_for(self, asserted: bool) -> bool {
        match self {
            ActiveLevel::High => asserted,
            ActiveLevel::Low => !asserted,
        }
    }

    /// Logical state for a sampled electrical level
    pub fn is_asserted(self, high: bool) -> bool {
        self.level_for(high)
    }
}
