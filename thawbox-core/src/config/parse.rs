//! Simple TOML parser for box configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! Thawbox configuration. It does NOT support all of TOML.
//!
//! Supported features:
//! - `[section]` headers (physics, ice, container, timing, pins, network)
//! - Key = value pairs (string, float, integer, pin)
//! - Underscore digit separators (`300_000`)
//! - Comments (# ...), including trailing comments after a value
//!
//! NOT supported:
//! - Multi-line strings or escape sequences
//! - Arrays, inline tables, datetimes
//! - Dotted keys
//!
//! Keys that are not present keep their default value, so an empty input
//! yields `BoxConfig::default()`.

use core::str::FromStr;

use heapless::String;

use super::types::{
    BoxConfig, ContainerConfig, IceConfig, NetworkConfig, PhysicalConstants, PinAssignments,
    PinConfig, TimingConfig,
};

/// Longest numeric literal accepted (after removing separators)
const MAX_NUMBER_LEN: usize = 32;

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Unknown section header, or a key before any section
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Key not known in the current section
    UnknownKey,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Pin string is not `gpioNN` with optional `!`/`^` modifiers
    InvalidPin,
    /// String does not fit its fixed-capacity field
    ValueTooLong,
}

/// Parse error with the 1-based line it occurred on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Physics,
    Ice,
    Container,
    Timing,
    Pins,
    Network,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "physics" => Some(Section::Physics),
            "ice" => Some(Section::Ice),
            "container" => Some(Section::Container),
            "timing" => Some(Section::Timing),
            "pins" => Some(Section::Pins),
            "network" => Some(Section::Network),
            _ => None,
        }
    }
}

/// Parse TOML configuration into a `BoxConfig`
pub fn parse_config(input: &str) -> Result<BoxConfig, ParseError> {
    let mut config = BoxConfig::default();
    let mut section: Option<Section> = None;

    for (index, raw) in input.lines().enumerate() {
        let at = |kind| ParseError {
            line: index + 1,
            kind,
        };
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let parsed = Section::from_name(name.trim()).ok_or(at(ParseErrorKind::InvalidSection))?;
            section = Some(parsed);
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(at(ParseErrorKind::InvalidLine))?;
        let current = section.ok_or(at(ParseErrorKind::InvalidSection))?;

        let result = match current {
            Section::Physics => apply_physics(&mut config.physics, key, value),
            Section::Ice => apply_ice(&mut config.ice, key, value),
            Section::Container => apply_container(&mut config.container, key, value),
            Section::Timing => apply_timing(&mut config.timing, key, value),
            Section::Pins => apply_pins(&mut config.pins, key, value),
            Section::Network => apply_network(&mut config.network, key, value),
        };
        result.map_err(at)?;
    }

    Ok(config)
}

fn apply_physics(
    physics: &mut PhysicalConstants,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match key {
        "specific_heat_ice" => physics.specific_heat_ice = parse_positive(value)?,
        "latent_heat_fusion" => physics.latent_heat_fusion = parse_positive(value)?,
        "convection_coeff" => physics.convection_coeff = parse_positive(value)?,
        "conduction_coeff" => physics.conduction_coeff = parse_positive(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

fn apply_ice(ice: &mut IceConfig, key: &str, value: &str) -> Result<(), ParseErrorKind> {
    match key {
        "mass_kg" => ice.mass_kg = parse_positive(value)?,
        "surface_area_m2" => ice.surface_area_m2 = parse_positive(value)?,
        "thickness_m" => ice.thickness_m = parse_positive(value)?,
        "volume_m3" => ice.volume_m3 = parse_positive(value)?,
        "water_ice_density_ratio" => ice.water_ice_density_ratio = parse_positive(value)?,
        "initial_temp_c" => {
            let t = parse_float(value)?;
            if t > 0.0 {
                return Err(ParseErrorKind::InvalidValue);
            }
            ice.initial_temp_c = t;
        }
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

fn apply_container(
    container: &mut ContainerConfig,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match key {
        "height_m" => container.height_m = parse_positive(value)?,
        "water_level_threshold" => container.water_level_threshold = parse_positive(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

fn apply_timing(timing: &mut TimingConfig, key: &str, value: &str) -> Result<(), ParseErrorKind> {
    match key {
        "measurement_interval_ms" => timing.measurement_interval_ms = parse_int(value)?,
        "upload_interval_ms" => timing.upload_interval_ms = parse_int(value)?,
        "buzzer_interval_ms" => timing.buzzer_interval_ms = parse_int(value)?,
        "ultrasonic_timeout_us" => timing.ultrasonic_timeout_us = parse_int(value)?,
        "telemetry_timeout_ms" => timing.telemetry_timeout_ms = parse_int(value)?,
        "notification_timeout_ms" => timing.notification_timeout_ms = parse_int(value)?,
        "join_attempts" => timing.join_attempts = parse_int(value)?,
        "join_retry_delay_ms" => timing.join_retry_delay_ms = parse_int(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

fn apply_pins(pins: &mut PinAssignments, key: &str, value: &str) -> Result<(), ParseErrorKind> {
    let slot = match key {
        "ambient_probe" => &mut pins.ambient_probe,
        "surface_probe" => &mut pins.surface_probe,
        "inner_probe" => &mut pins.inner_probe,
        "base_probe" => &mut pins.base_probe,
        "ultrasonic_trigger" => &mut pins.ultrasonic_trigger,
        "ultrasonic_echo" => &mut pins.ultrasonic_echo,
        "buzzer" => &mut pins.buzzer,
        "indicator" => &mut pins.indicator,
        "reset_button" => &mut pins.reset_button,
        "modem_tx" => &mut pins.modem_tx,
        "modem_rx" => &mut pins.modem_rx,
        _ => return Err(ParseErrorKind::UnknownKey),
    };
    *slot = parse_pin(value)?;
    Ok(())
}

fn apply_network(
    network: &mut NetworkConfig,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match key {
        "wifi_ssid" => network.wifi_ssid = parse_heapless(value)?,
        "wifi_password" => network.wifi_password = parse_heapless(value)?,
        "telemetry_host" => network.telemetry_host = parse_heapless(value)?,
        "telemetry_path" => network.telemetry_path = parse_heapless(value)?,
        "telemetry_api_key" => network.telemetry_api_key = parse_heapless(value)?,
        "notify_host" => network.notify_host = parse_heapless(value)?,
        "notify_path" => network.notify_path = parse_heapless(value)?,
        "author" => network.author = parse_heapless(value)?,
        "secret_key" => network.secret_key = parse_heapless(value)?,
        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

/// Cut a trailing `# comment` that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        // Allow unquoted strings for simple values
        .unwrap_or(value)
}

fn parse_heapless<const N: usize>(value: &str) -> Result<String<N>, ParseErrorKind> {
    String::try_from(parse_string(value)).map_err(|_| ParseErrorKind::ValueTooLong)
}

/// Copy a numeric literal without `_` separators
fn digits(value: &str) -> Result<String<MAX_NUMBER_LEN>, ParseErrorKind> {
    let mut out = String::new();
    for c in value.chars().filter(|&c| c != '_') {
        out.push(c).map_err(|_| ParseErrorKind::InvalidValue)?;
    }
    Ok(out)
}

/// Parse an integer value
fn parse_int<T: FromStr>(value: &str) -> Result<T, ParseErrorKind> {
    digits(value)?
        .parse()
        .map_err(|_| ParseErrorKind::InvalidValue)
}

/// Parse a finite float value (integers are accepted)
fn parse_float(value: &str) -> Result<f32, ParseErrorKind> {
    let v: f32 = digits(value)?
        .parse()
        .map_err(|_| ParseErrorKind::InvalidValue)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ParseErrorKind::InvalidValue)
    }
}

fn parse_positive(value: &str) -> Result<f32, ParseErrorKind> {
    let v = parse_float(value)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(ParseErrorKind::InvalidValue)
    }
}

/// Parse a pin: a bare number (`13`) or a pin string like "gpio13", "^!gpio2"
///
/// `!` marks the pin active-low, `^` enables the internal pull-up.
fn parse_pin(value: &str) -> Result<PinConfig, ParseErrorKind> {
    if let Ok(pin) = value.parse::<u8>() {
        return check_pin(PinConfig::new(pin));
    }

    let mut s = parse_string(value);
    let mut inverted = false;
    let mut pull_up = false;

    // Check for modifiers
    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let number = s.strip_prefix("gpio").ok_or(ParseErrorKind::InvalidPin)?;
    let pin: u8 = number.parse().map_err(|_| ParseErrorKind::InvalidPin)?;

    check_pin(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

fn check_pin(pin: PinConfig) -> Result<PinConfig, ParseErrorKind> {
    // RP2040 exposes GPIO0..=GPIO29
    if pin.pin <= 29 {
        Ok(pin)
    } else {
        Err(ParseErrorKind::InvalidPin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), BoxConfig::default());
        assert_eq!(
            parse_config("# only a comment\n\n").unwrap(),
            BoxConfig::default()
        );
    }

    #[test]
    fn test_full_config() {
        let input = r#"
# Reference box
[physics]
specific_heat_ice = 2108
latent_heat_fusion = 334_000.0
convection_coeff = 30.5   # windy lab

[ice]
mass_kg = 0.75
initial_temp_c = -18

[container]
height_m = 0.2

[timing]
measurement_interval_ms = 2000
upload_interval_ms = 60_000

[pins]
buzzer = 9
reset_button = "^!gpio3"
ambient_probe = "gpio14"

[network]
wifi_ssid = "lab#2"
wifi_password = "hunter2"
author = "Team A"
"#;
        let config = parse_config(input).unwrap();
        assert_eq!(config.physics.convection_coeff, 30.5);
        assert_eq!(config.physics.latent_heat_fusion, 334_000.0);
        assert_eq!(config.ice.mass_kg, 0.75);
        assert_eq!(config.ice.initial_temp_c, -18.0);
        assert_eq!(config.container.height_m, 0.2);
        assert_eq!(config.timing.measurement_interval_ms, 2000);
        assert_eq!(config.timing.upload_interval_ms, 60_000);
        assert_eq!(config.pins.buzzer, PinConfig::new(9));
        assert_eq!(config.pins.reset_button, PinConfig::active_low_pullup(3));
        assert_eq!(config.pins.ambient_probe.pin, 14);
        assert_eq!(config.network.wifi_ssid.as_str(), "lab#2");
        assert_eq!(config.network.author.as_str(), "Team A");

        // Untouched keys keep their defaults
        assert_eq!(config.ice.thickness_m, 0.1);
        assert_eq!(config.timing.buzzer_interval_ms, 1000);
    }

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin("gpio11").unwrap();
        assert_eq!(pin.pin, 11);
        assert!(!pin.inverted);
        assert!(!pin.pull_up);

        let pin = parse_pin("!gpio12").unwrap();
        assert_eq!(pin.pin, 12);
        assert!(pin.inverted);

        let pin = parse_pin("^gpio4").unwrap();
        assert_eq!(pin.pin, 4);
        assert!(pin.pull_up);

        let pin = parse_pin("\"^!gpio5\"").unwrap();
        assert_eq!(pin.pin, 5);
        assert!(pin.inverted);
        assert!(pin.pull_up);

        assert_eq!(parse_pin("7").unwrap(), PinConfig::new(7));
        assert_eq!(parse_pin("gpio30"), Err(ParseErrorKind::InvalidPin));
        assert_eq!(parse_pin("pin4"), Err(ParseErrorKind::InvalidPin));
    }

    #[test]
    fn test_error_reports_line() {
        let err = parse_config("[ice]\nmass_kg = 0.5\nmass_kg = heavy\n").unwrap_err();
        assert_eq!(
            err,
            ParseError {
                line: 3,
                kind: ParseErrorKind::InvalidValue
            }
        );
    }

    #[test]
    fn test_unknown_section_and_key() {
        assert_eq!(
            parse_config("[heater]\n").unwrap_err().kind,
            ParseErrorKind::InvalidSection
        );
        assert_eq!(
            parse_config("[ice]\ncolour = \"blue\"\n").unwrap_err().kind,
            ParseErrorKind::UnknownKey
        );
    }

    #[test]
    fn test_key_before_section() {
        assert_eq!(
            parse_config("mass_kg = 1.0\n").unwrap_err().kind,
            ParseErrorKind::InvalidSection
        );
    }

    #[test]
    fn test_malformed_line() {
        assert_eq!(
            parse_config("[ice]\njust words\n").unwrap_err().kind,
            ParseErrorKind::InvalidLine
        );
    }

    #[test]
    fn test_rejects_non_physical_values() {
        assert_eq!(
            parse_config("[ice]\nmass_kg = 0\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            parse_config("[ice]\ninitial_temp_c = 4\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            parse_config("[physics]\nconvection_coeff = inf\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
        assert_eq!(
            parse_config("[timing]\njoin_attempts = 300\n").unwrap_err().kind,
            ParseErrorKind::InvalidValue
        );
    }

    #[test]
    fn test_string_too_long() {
        let input = "[network]\nwifi_ssid = \"this ssid is far longer than thirty-two bytes\"\n";
        assert_eq!(
            parse_config(input).unwrap_err().kind,
            ParseErrorKind::ValueTooLong
        );
    }

    #[test]
    fn test_strip_comment_respects_strings() {
        assert_eq!(strip_comment("a = 1 # c"), "a = 1 ");
        assert_eq!(strip_comment("a = \"x#y\" # c"), "a = \"x#y\" ");
        assert_eq!(strip_comment("# all comment"), "");
    }
}
