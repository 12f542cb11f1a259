//! Polling loop
//!
//! One iteration per `measurement_interval_ms`: sweep the sensors, run a
//! monitor cycle, service the alert, and push telemetry when it is due.
//! Uplink failures are logged and the loop carries on offline.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use thawbox_core::alert::AlertUpdate;
use thawbox_core::config::BoxConfig;
use thawbox_core::monitor::{CycleReport, Monitor};
use thawbox_core::sensors::TemperatureReadings;
use thawbox_core::telemetry::{completion_message, telemetry_row};
use thawbox_core::traits::Uplink;

use crate::board::{Alerts, Hub, Net};

/// Samples averaged for the log line written with each upload
const AVERAGE_WINDOW: usize = 10;

/// Monitor task - owns the sensors, the run state and the uplink
#[embassy_executor::task]
pub async fn monitor_task(
    mut hub: Hub,
    mut alerts: Alerts,
    mut uplink: Option<Net>,
    monitor: &'static mut Monitor,
    config: &'static BoxConfig,
) {
    info!("Monitor task started");

    let period = Duration::from_millis(config.timing.measurement_interval_ms);
    let mut ticker = Ticker::every(period);
    // A restart needs a fresh press, not the one that silenced the alert
    let mut reset_held = false;

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();

        let temps = hub.read_temperatures();
        if let Some((probe, e)) = temps.fault {
            warn!("{} probe: {:?}", probe.name(), e);
        }
        let water = hub.read_water_level();
        if let Some(e) = water.fault {
            warn!("Water level: {:?}", e);
        }

        let report = monitor.cycle(now_ms, &temps, &water);
        trace!("{}", report.point);

        // Local signal first; the notification may block on the network
        let update = if report.trigger_alert {
            alerts.raise(now_ms)
        } else {
            alerts.update(now_ms)
        };

        match update {
            AlertUpdate::Silenced => {
                info!("Alert silenced");
                reset_held = true;
            }
            AlertUpdate::Idle => {
                let pressed = alerts.reset_asserted();
                if pressed && !reset_held && monitor.alert_latched() {
                    restart(monitor, &temps, config);
                }
                reset_held = pressed;
            }
            AlertUpdate::Holding | AlertUpdate::Toggled => {}
        }

        if report.trigger_alert {
            announce(&report, uplink.as_mut(), config);
        }

        if report.upload_due {
            upload(&report, monitor, uplink.as_mut());
            monitor.mark_uploaded(now_ms);
        }
    }
}

/// Log the completion and send the notification
fn announce(report: &CycleReport, uplink: Option<&mut Net>, config: &BoxConfig) {
    let status = report.status;
    info!(
        "Melt complete after {} s: model={}, water level={}",
        report.point.timestamp_ms / 1000,
        status.model_melted,
        status.water_confirmed
    );
    if !status.signals_agree() {
        warn!("Model and water level disagree");
    }

    let Some(net) = uplink else {
        return;
    };
    if !config.network.notifications_enabled() {
        debug!("Notifications not configured");
        return;
    }

    let message = match completion_message(&report.point, &status) {
        Ok(message) => message,
        Err(_) => {
            warn!("Completion message does not fit");
            return;
        }
    };
    match net.push_notification(&config.network.author, &config.network.secret_key, &message) {
        Ok(()) => info!("Notification sent"),
        Err(e) => warn!("Notification failed: {:?}", e),
    }
}

/// Log recent averages and push the latest point
fn upload(report: &CycleReport, monitor: &Monitor, uplink: Option<&mut Net>) {
    let avg = monitor.log().average_over_last_n(AVERAGE_WINDOW);
    info!(
        "Last {} samples: ambient {} °C, surface {} °C, inner {} °C, base {} °C",
        avg.samples,
        avg.ambient_c,
        avg.surface_c,
        avg.inner_c,
        avg.base_c
    );
    let invalid = monitor
        .log()
        .last_n(AVERAGE_WINDOW)
        .filter(|p| !p.is_valid)
        .count();
    if invalid > 0 {
        warn!("{} of those samples were invalid and skew the means", invalid);
    }
    info!(
        "Progress {} %, remaining {} s",
        report.point.melt_progress,
        report.point.remaining_time_s
    );

    let Some(net) = uplink else {
        return;
    };
    match net.push_telemetry(&telemetry_row(&report.point)) {
        Ok(()) => info!("Telemetry uploaded"),
        Err(e) => warn!("Telemetry upload failed: {:?}", e),
    }
}

/// Start a new run after the operator presses reset on a finished one
fn restart(monitor: &mut Monitor, temps: &TemperatureReadings, config: &BoxConfig) {
    let initial_temp_c = <Monitor>::starting_temperature(temps, config.ice.initial_temp_c);
    match monitor.restart(initial_temp_c) {
        Ok(()) => info!("New run started at {} °C", initial_temp_c),
        Err(e) => error!("Restart failed: {:?}", e),
    }
}
