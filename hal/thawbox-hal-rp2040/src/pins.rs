//! Pin allocation by number for config-driven setup
//!
//! GPIO numbers come from `thawbox.toml`, so pins are taken from a bank at
//! runtime instead of by field name. GPIO0 and GPIO1 carry the modem UART
//! and stay out of the bank as typed peripherals.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::{PIN_0, PIN_1, UART0};
use embassy_rp::{Peri, Peripherals};

/// Number of GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// GPIO used for the modem UART TX
pub const MODEM_TX_PIN: u8 = 0;

/// GPIO used for the modem UART RX
pub const MODEM_RX_PIN: u8 = 1;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin,
    /// Pin already taken
    AlreadyTaken,
    /// Pin reserved for the modem UART
    Reserved,
}

/// Peripherals that stay outside the bank
pub struct RemainingPeripherals {
    pub uart0: Peri<'static, UART0>,
    pub modem_tx: Peri<'static, PIN_0>,
    pub modem_rx: Peri<'static, PIN_1>,
}

/// Holds the general-purpose GPIOs and hands them out by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

impl PinBank {
    /// Split the peripherals into the bank and the typed remainder
    pub fn from_peripherals(p: Peripherals) -> (Self, RemainingPeripherals) {
        let bank = Self {
            pins: [
                None,
                None,
                Some(p.PIN_2.into()),
                Some(p.PIN_3.into()),
                Some(p.PIN_4.into()),
                Some(p.PIN_5.into()),
                Some(p.PIN_6.into()),
                Some(p.PIN_7.into()),
                Some(p.PIN_8.into()),
                Some(p.PIN_9.into()),
                Some(p.PIN_10.into()),
                Some(p.PIN_11.into()),
                Some(p.PIN_12.into()),
                Some(p.PIN_13.into()),
                Some(p.PIN_14.into()),
                Some(p.PIN_15.into()),
                Some(p.PIN_16.into()),
                Some(p.PIN_17.into()),
                Some(p.PIN_18.into()),
                Some(p.PIN_19.into()),
                Some(p.PIN_20.into()),
                Some(p.PIN_21.into()),
                Some(p.PIN_22.into()),
                Some(p.PIN_23.into()),
                Some(p.PIN_24.into()),
                Some(p.PIN_25.into()),
                Some(p.PIN_26.into()),
                Some(p.PIN_27.into()),
                Some(p.PIN_28.into()),
                Some(p.PIN_29.into()),
            ],
        };
        let remaining = RemainingPeripherals {
            uart0: p.UART0,
            modem_tx: p.PIN_0,
            modem_rx: p.PIN_1,
        };
        (bank, remaining)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        if pin_num as usize >= GPIO_COUNT {
            return Err(PinError::InvalidPin);
        }
        if pin_num == MODEM_TX_PIN || pin_num == MODEM_RX_PIN {
            return Err(PinError::Reserved);
        }
        self.pins[pin_num as usize]
            .take()
            .ok_or(PinError::AlreadyTaken)
    }

    /// Check if a pin is available
    pub fn is_available(&self, pin_num: u8) -> bool {
        self.pins
            .get(pin_num as usize)
            .is_some_and(|slot| slot.is_some())
    }
}
