//! Build script for thawbox-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates thawbox.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Known sections and their keys
const SECTIONS: &[(&str, &[&str])] = &[
    (
        "physics",
        &[
            "specific_heat_ice",
            "latent_heat_fusion",
            "convection_coeff",
            "conduction_coeff",
        ],
    ),
    (
        "ice",
        &[
            "mass_kg",
            "surface_area_m2",
            "thickness_m",
            "volume_m3",
            "water_ice_density_ratio",
            "initial_temp_c",
        ],
    ),
    ("container", &["height_m", "water_level_threshold"]),
    (
        "timing",
        &[
            "measurement_interval_ms",
            "upload_interval_ms",
            "buzzer_interval_ms",
            "ultrasonic_timeout_us",
            "telemetry_timeout_ms",
            "notification_timeout_ms",
            "join_attempts",
            "join_retry_delay_ms",
        ],
    ),
    (
        "pins",
        &[
            "ambient_probe",
            "surface_probe",
            "inner_probe",
            "base_probe",
            "ultrasonic_trigger",
            "ultrasonic_echo",
            "buzzer",
            "indicator",
            "reset_button",
            "modem_tx",
            "modem_rx",
        ],
    ),
    (
        "network",
        &[
            "wifi_ssid",
            "wifi_password",
            "telemetry_host",
            "telemetry_path",
            "telemetry_api_key",
            "notify_host",
            "notify_path",
            "author",
            "secret_key",
        ],
    ),
];

/// Maximum string lengths, matching the firmware's fixed-capacity buffers
const STRING_LIMITS: &[(&str, usize)] = &[
    ("wifi_ssid", 32),
    ("wifi_password", 64),
    ("telemetry_host", 64),
    ("telemetry_path", 64),
    ("telemetry_api_key", 32),
    ("notify_host", 64),
    ("notify_path", 64),
    ("author", 32),
    ("secret_key", 32),
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate thawbox.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=thawbox.toml");

    let config_path = Path::new("thawbox.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: thawbox.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds thawbox.toml as its configuration.          ║\n\
            ║  Please create one in the thawbox-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read thawbox.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in thawbox.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_structure(&config, &mut errors);
    validate_values(&config, &mut errors);
    validate_pins(&config, &mut errors);
    validate_geometry(&config, &mut errors);
    report("Invalid configuration in thawbox.toml", &errors);

    println!("cargo:warning=thawbox.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Only known sections and keys are allowed
fn validate_structure(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return;
    };

    for (section, value) in root {
        let Some((_, keys)) = SECTIONS.iter().find(|(name, _)| *name == section.as_str()) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", section, key));
            }
        }
    }
}

fn number(config: &toml::Value, section: &str, key: &str) -> Option<f64> {
    match config.get(section)?.get(key)? {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}

/// Numeric ranges and string lengths
fn validate_values(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["physics", "ice", "container", "timing"] {
        let Some(table) = config.get(section).and_then(|s| s.as_table()) else {
            continue;
        };
        for (key, value) in table {
            let Some(n) = number(config, section, key) else {
                errors.push(format!("[{}] '{}' must be a number", section, key));
                continue;
            };
            if key == "initial_temp_c" {
                if n > 0.0 {
                    errors.push("[ice] initial_temp_c must be <= 0".to_string());
                }
            } else if n <= 0.0 {
                errors.push(format!("[{}] '{}' must be positive", section, key));
            }
            if section == "timing" && matches!(value, toml::Value::Float(_)) {
                errors.push(format!("[timing] '{}' must be an integer", key));
            }
        }
    }

    if let Some(n) = number(config, "container", "water_level_threshold") {
        if n > 1.0 {
            errors.push("[container] water_level_threshold must be <= 1".to_string());
        }
    }
    if let Some(n) = number(config, "timing", "join_attempts") {
        if n > 255.0 {
            errors.push("[timing] join_attempts must be <= 255".to_string());
        }
    }

    let Some(network) = config.get("network").and_then(|n| n.as_table()) else {
        return;
    };
    for (key, value) in network {
        let Some(s) = value.as_str() else {
            errors.push(format!("[network] '{}' must be a string", key));
            continue;
        };
        if let Some((_, limit)) = STRING_LIMITS.iter().find(|(name, _)| *name == key.as_str()) {
            if s.len() > *limit {
                errors.push(format!("[network] '{}' longer than {} bytes", key, limit));
            }
        }
    }
}

/// Parse a pin value: a bare number or "gpioN" with `!`/`^` modifiers
fn parse_pin(value: &toml::Value) -> Option<u8> {
    let pin = match value {
        toml::Value::Integer(i) => u8::try_from(*i).ok()?,
        toml::Value::String(s) => s
            .trim_start_matches(['!', '^'])
            .strip_prefix("gpio")?
            .parse()
            .ok()?,
        _ => return None,
    };
    (pin <= 29).then_some(pin)
}

/// Pin numbers are valid RP2040 GPIOs and used once
fn validate_pins(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(pins) = config.get("pins").and_then(|p| p.as_table()) else {
        return;
    };

    let mut seen: Vec<(u8, &str)> = Vec::new();
    for (key, value) in pins {
        let Some(pin) = parse_pin(value) else {
            errors.push(format!("[pins] '{}' is not a valid GPIO (0-29)", key));
            continue;
        };
        if let Some((_, other)) = seen.iter().find(|(p, _)| *p == pin) {
            errors.push(format!("[pins] gpio{} used by '{}' and '{}'", pin, other, key));
        }
        seen.push((pin, key.as_str()));
    }

    for (key, expected) in [("modem_tx", 0), ("modem_rx", 1)] {
        if let Some(pin) = pins.get(key).and_then(parse_pin) {
            if pin != expected {
                println!(
                    "cargo:warning=[pins] {} = {} is unsupported, the modem runs on gpio0/gpio1 only",
                    key, pin
                );
            }
        }
    }
}

/// Melted ice must fit below the ultrasonic probe
fn validate_geometry(config: &toml::Value, errors: &mut Vec<String>) {
    let thickness = number(config, "ice", "thickness_m").unwrap_or(0.1);
    let ratio = number(config, "ice", "water_ice_density_ratio").unwrap_or(0.917);
    let height = number(config, "container", "height_m").unwrap_or(0.15);

    if thickness * ratio >= height {
        errors.push(format!(
            "expected water level {:.3} m reaches the probe ({:.3} m)",
            thickness * ratio,
            height
        ));
    }
}
