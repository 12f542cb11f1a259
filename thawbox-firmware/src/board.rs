//! Hardware assembly from the pin configuration
//!
//! Turns GPIO numbers from `thawbox.toml` into concrete drivers. The
//! aliases name the exact driver stacks the monitor task runs on.

use defmt::*;
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;

use thawbox_core::alert::AlertController;
use thawbox_core::config::{BoxConfig, PinConfig};
use thawbox_core::sensors::SensorHub;
use thawbox_drivers::alert::{GpioAnnunciator, GpioResetButton};
use thawbox_drivers::net::{EspAtModem, HttpUplink, ModemTiming};
use thawbox_drivers::sensor::{Ds18b20, HcSr04};
use thawbox_hal_rp2040::pins::{MODEM_RX_PIN, MODEM_TX_PIN};
use thawbox_hal_rp2040::{
    EmbassyClock, FlexOneWire, ModemUart, PinBank, PinError, PulseInput, RemainingPeripherals,
    RpInput, RpOutput,
};

use crate::Irqs;

pub type TempProbe = Ds18b20<FlexOneWire<'static>, Delay, EmbassyClock>;
pub type RangeFinder = HcSr04<RpOutput<'static>, PulseInput<'static>, Delay>;
pub type Hub = SensorHub<TempProbe, RangeFinder>;
pub type Alerts = AlertController<
    GpioAnnunciator<RpOutput<'static>, RpOutput<'static>>,
    GpioResetButton<RpInput<'static>>,
>;
pub type Modem = EspAtModem<ModemUart, EmbassyClock, Delay>;
pub type Net = HttpUplink<Modem>;

// UART ring buffers (must live forever)
static TX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 1024]> = StaticCell::new();

fn probe(bank: &mut PinBank, pin: &PinConfig) -> Result<TempProbe, PinError> {
    let bus = FlexOneWire::new(bank.take(pin.pin)?);
    Ok(Ds18b20::new(bus, Delay, EmbassyClock))
}

/// Four probes and the range finder
pub fn sensor_hub(bank: &mut PinBank, config: &BoxConfig) -> Result<Hub, PinError> {
    let pins = &config.pins;
    let probes = [
        probe(bank, &pins.ambient_probe)?,
        probe(bank, &pins.surface_probe)?,
        probe(bank, &pins.inner_probe)?,
        probe(bank, &pins.base_probe)?,
    ];

    let trigger = RpOutput::new(bank.take(pins.ultrasonic_trigger.pin)?, false);
    let echo = PulseInput::new(bank.take(pins.ultrasonic_echo.pin)?);
    let range = HcSr04::new(trigger, echo, Delay, config.timing.ultrasonic_timeout_us);

    Ok(SensorHub::new(probes, range, config))
}

/// Buzzer, indicator and reset button
pub fn alerts(bank: &mut PinBank, config: &BoxConfig) -> Result<Alerts, PinError> {
    let pins = &config.pins;
    // Idle level is high for active-low outputs
    let buzzer = RpOutput::new(bank.take(pins.buzzer.pin)?, pins.buzzer.inverted);
    let indicator = RpOutput::new(bank.take(pins.indicator.pin)?, pins.indicator.inverted);
    let annunciator =
        GpioAnnunciator::from_config(buzzer, &pins.buzzer, indicator, &pins.indicator);

    let reset_pin = RpInput::new(
        bank.take(pins.reset_button.pin)?,
        pins.reset_button.pull_up,
    );
    let reset = GpioResetButton::from_config(reset_pin, &pins.reset_button);

    Ok(AlertController::new(
        annunciator,
        reset,
        config.timing.buzzer_interval_ms,
    ))
}

/// ESP-AT modem on UART0, if the box is configured to go online
pub fn modem(rest: RemainingPeripherals, config: &BoxConfig) -> Option<Modem> {
    if !config.network.is_online() {
        return None;
    }
    if config.pins.modem_tx.pin != MODEM_TX_PIN || config.pins.modem_rx.pin != MODEM_RX_PIN {
        error!(
            "Modem must be on gpio{}/gpio{}, running offline",
            MODEM_TX_PIN,
            MODEM_RX_PIN
        );
        return None;
    }

    let tx_buf = TX_BUF.init([0u8; 1024]);
    let rx_buf = RX_BUF.init([0u8; 1024]);

    // 115200 baud, the ESP-AT factory default
    let uart = Uart::new_blocking(
        rest.uart0,
        rest.modem_tx,
        rest.modem_rx,
        UartConfig::default(),
    );
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    let t = &config.timing;
    let timing = ModemTiming {
        join_attempts: t.join_attempts,
        join_retry_delay_ms: t.join_retry_delay_ms,
        ..ModemTiming::default()
    };
    Some(EspAtModem::new(
        ModemUart::new(uart),
        EmbassyClock,
        Delay,
        timing,
    ))
}
