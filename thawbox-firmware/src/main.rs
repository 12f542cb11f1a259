//! Thawbox - Ice-Melt Experiment Box Firmware
//!
//! Main firmware binary for RP2040-based experiment boxes. Four probes
//! watch a block of ice melt, a heat-transfer model predicts when it will
//! be gone, an ultrasonic probe confirms the meltwater level, and
//! telemetry goes out through an ESP-AT WiFi co-processor.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::BufferedInterruptHandler;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use thawbox_core::config::{self, BoxConfig};
use thawbox_core::monitor::Monitor;
use thawbox_core::sensors::Probe;
use thawbox_drivers::net::HttpUplink;
use thawbox_hal_rp2040::PinBank;

mod board;
mod tasks;

/// Embedded configuration (compiled into firmware)
/// Edit thawbox.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../thawbox.toml");

bind_interrupts!(pub struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for state shared with the monitor task (must live forever)
static CONFIG: StaticCell<BoxConfig> = StaticCell::new();
static MONITOR: StaticCell<Monitor> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Thawbox firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static BoxConfig = CONFIG.init(load_config());
    log_config(config);

    let (mut bank, rest) = PinBank::from_peripherals(p);

    let mut hub = match board::sensor_hub(&mut bank, config) {
        Ok(hub) => hub,
        Err(e) => defmt::panic!("Sensor pin setup failed: {:?}", e),
    };
    for probe in Probe::ALL {
        if let Err(e) = hub.probe_mut(probe).init() {
            warn!("{} probe not answering: {:?}", probe.name(), e);
        }
    }

    let alerts = match board::alerts(&mut bank, config) {
        Ok(alerts) => alerts,
        Err(e) => defmt::panic!("Alert pin setup failed: {:?}", e),
    };
    info!("Sensors and alert outputs initialized");

    let uplink = board::modem(rest, config).map(|mut modem| {
        if let Err(e) = modem.init() {
            warn!("Modem not responding: {:?}", e);
        }
        let mut net = HttpUplink::new(modem, config.network.clone(), &config.timing);
        match net.connect() {
            Ok(()) => info!("WiFi joined"),
            Err(e) => warn!("WiFi join failed: {:?}, retrying on next upload", e),
        }
        net
    });
    if uplink.is_none() {
        info!("No network configured, running offline");
    }

    // The inner probe gives the block's starting temperature
    let first = hub.read_temperatures();
    let initial_temp_c = <Monitor>::starting_temperature(&first, config.ice.initial_temp_c);
    let monitor = match Monitor::new(config, initial_temp_c) {
        Ok(monitor) => MONITOR.init(monitor),
        Err(e) => defmt::panic!("Melt model rejected configuration: {:?}", e),
    };
    info!(
        "Run started: {} kg at {} °C, {} J to melt",
        config.ice.mass_kg,
        initial_temp_c,
        monitor.model().initial_total_energy()
    );

    spawner
        .spawn(tasks::monitor_task(hub, alerts, uplink, monitor, config))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration, falling back to the reference box
fn load_config() -> BoxConfig {
    match config::load(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            // build.rs validates thawbox.toml, so this only trips on
            // rules the build-time check does not know about
            error!("Failed to load embedded config: {:?}", e);
            error!("Using reference-box defaults");
            BoxConfig::default()
        }
    }
}

fn log_config(config: &BoxConfig) {
    let t = &config.timing;
    info!(
        "Timing: measure every {} ms, upload every {} ms, buzzer {} ms",
        t.measurement_interval_ms, t.upload_interval_ms, t.buzzer_interval_ms
    );
    info!(
        "Ice: {} kg, {} m thick; water level confirms at {} m",
        config.ice.mass_kg,
        config.ice.thickness_m,
        config.ice.expected_water_level_m() * config.container.water_level_threshold
    );
}
