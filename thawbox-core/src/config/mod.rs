//! Configuration types
//!
//! Board-agnostic configuration structures, the startup TOML parser, and
//! cross-field validation.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use types::*;

/// Cross-field configuration problems the line parser cannot see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Parse failure
    Parse(ParseError),
    /// The same GPIO is assigned to two functions
    DuplicatePin(u8),
    /// A loop or alert interval is zero
    ZeroInterval,
    /// Melted ice would not fit below the ultrasonic probe
    ContainerTooShallow,
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

/// Check invariants that span several fields
pub fn validate(config: &BoxConfig) -> Result<(), ConfigError> {
    if let Some(pin) = config.pins.find_duplicate() {
        return Err(ConfigError::DuplicatePin(pin));
    }

    let t = &config.timing;
    if t.measurement_interval_ms == 0 || t.upload_interval_ms == 0 || t.buzzer_interval_ms == 0 {
        return Err(ConfigError::ZeroInterval);
    }

    if config.ice.expected_water_level_m() >= config.container.height_m {
        return Err(ConfigError::ContainerTooShallow);
    }

    Ok(())
}

/// Parse and validate in one step
pub fn load(input: &str) -> Result<BoxConfig, ConfigError> {
    let config = parse_config(input)?;
    validate(&config)?;
    Ok(config)
}
