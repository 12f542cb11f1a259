//! Configuration type definitions
//!
//! These types describe one experiment box. Configuration is embedded in
//! the firmware image as TOML and parsed once at startup; every value is
//! immutable afterwards. `Default` reproduces the reference box.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum WiFi SSID length (802.11 limit)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WiFi passphrase length (WPA2 limit)
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum host name length
pub const MAX_HOST_LEN: usize = 64;

/// Maximum request path length
pub const MAX_PATH_LEN: usize = 64;

/// Maximum length of short credentials (API key, author, secret)
pub const MAX_KEY_LEN: usize = 32;

/// Physical constants used by the melt model
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhysicalConstants {
    /// Specific heat of ice, J/(kg·°C)
    pub specific_heat_ice: f32,
    /// Latent heat of fusion, J/kg
    pub latent_heat_fusion: f32,
    /// Convection coefficient, W/(m²·°C)
    pub convection_coeff: f32,
    /// Conduction coefficient of the base plate, W/(m·°C)
    pub conduction_coeff: f32,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            specific_heat_ice: 2108.0,
            latent_heat_fusion: 334_000.0,
            convection_coeff: 25.0,
            conduction_coeff: 2.22,
        }
    }
}

/// Ice block geometry and starting state
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IceConfig {
    /// Ice mass, kg
    pub mass_kg: f32,
    /// Total exposed surface area, m²
    pub surface_area_m2: f32,
    /// Block thickness, m
    pub thickness_m: f32,
    /// Block volume, m³
    pub volume_m3: f32,
    /// Ratio of ice density to water density
    pub water_ice_density_ratio: f32,
    /// Starting temperature used when the inner probe gives no reading, °C
    pub initial_temp_c: f32,
}

impl Default for IceConfig {
    fn default() -> Self {
        Self {
            mass_kg: 0.5,
            surface_area_m2: 0.06,
            thickness_m: 0.1,
            volume_m3: 0.001,
            water_ice_density_ratio: 0.917,
            initial_temp_c: -10.0,
        }
    }
}

impl IceConfig {
    /// Water level expected once the whole block has melted, m
    pub fn expected_water_level_m(&self) -> f32 {
        self.thickness_m * self.water_ice_density_ratio
    }
}

/// Container geometry used by the water-level probe
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContainerConfig {
    /// Distance from the ultrasonic probe to the container floor, m
    pub height_m: f32,
    /// Fraction of the expected level that confirms a full melt
    pub water_level_threshold: f32,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            height_m: 0.15,
            water_level_threshold: 0.95,
        }
    }
}

/// Loop cadence and collaborator timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Polling loop period, ms
    ///
    /// A probe sweep waits for one 750 ms DS18B20 conversion, so shorter
    /// periods only make the loop run back to back.
    pub measurement_interval_ms: u64,
    /// Telemetry upload period, ms
    pub upload_interval_ms: u64,
    /// Buzzer and indicator toggle period while alerting, ms
    pub buzzer_interval_ms: u64,
    /// Maximum echo pulse width before the range finder gives up, µs
    pub ultrasonic_timeout_us: u32,
    /// Response drain timeout for telemetry posts, ms
    pub telemetry_timeout_ms: u64,
    /// Response drain timeout for notifications, ms
    pub notification_timeout_ms: u64,
    /// WiFi join attempts before giving up
    pub join_attempts: u8,
    /// Delay between WiFi join attempts, ms
    pub join_retry_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            measurement_interval_ms: 1000,
            upload_interval_ms: 300_000,
            buzzer_interval_ms: 1000,
            ultrasonic_timeout_us: 25_000,
            telemetry_timeout_ms: 5000,
            notification_timeout_ms: 10_000,
            join_attempts: 5,
            join_retry_delay_ms: 5000,
        }
    }
}

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number (0-29 for RP2040)
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an active-low input with the internal pull-up enabled
    pub const fn active_low_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: true,
        }
    }
}

/// Pin assignments for every peripheral on the box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinAssignments {
    /// Ambient air probe (1-Wire data line)
    pub ambient_probe: PinConfig,
    /// Ice surface probe
    pub surface_probe: PinConfig,
    /// Ice core probe
    pub inner_probe: PinConfig,
    /// Base plate probe
    pub base_probe: PinConfig,
    /// HC-SR04 trigger
    pub ultrasonic_trigger: PinConfig,
    /// HC-SR04 echo
    pub ultrasonic_echo: PinConfig,
    /// Buzzer output
    pub buzzer: PinConfig,
    /// Status indicator LED
    pub indicator: PinConfig,
    /// Reset button (active-low with pull-up)
    pub reset_button: PinConfig,
    /// UART TX towards the WiFi co-processor
    pub modem_tx: PinConfig,
    /// UART RX from the WiFi co-processor
    pub modem_rx: PinConfig,
}

impl Default for PinAssignments {
    fn default() -> Self {
        Self {
            ambient_probe: PinConfig::new(13),
            surface_probe: PinConfig::new(12),
            inner_probe: PinConfig::new(11),
            base_probe: PinConfig::new(10),
            ultrasonic_trigger: PinConfig::new(4),
            ultrasonic_echo: PinConfig::new(5),
            buzzer: PinConfig::new(8),
            indicator: PinConfig::new(7),
            reset_button: PinConfig::active_low_pullup(2),
            modem_tx: PinConfig::new(0),
            modem_rx: PinConfig::new(1),
        }
    }
}

impl PinAssignments {
    /// All assigned pins, for duplicate detection
    pub fn all(&self) -> [PinConfig; 11] {
        [
            self.ambient_probe,
            self.surface_probe,
            self.inner_probe,
            self.base_probe,
            self.ultrasonic_trigger,
            self.ultrasonic_echo,
            self.buzzer,
            self.indicator,
            self.reset_button,
            self.modem_tx,
            self.modem_rx,
        ]
    }

    /// First GPIO number assigned to more than one function, if any
    pub fn find_duplicate(&self) -> Option<u8> {
        let pins = self.all();
        pins.iter().enumerate().find_map(|(i, a)| {
            pins[i + 1..]
                .iter()
                .any(|b| b.pin == a.pin)
                .then_some(a.pin)
        })
    }
}

/// Network credentials and service endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkConfig {
    /// WiFi network name; empty runs the box offline
    pub wifi_ssid: String<MAX_SSID_LEN>,
    /// WiFi passphrase
    pub wifi_password: String<MAX_PASSWORD_LEN>,
    /// Metrics server host
    pub telemetry_host: String<MAX_HOST_LEN>,
    /// Metrics update path
    pub telemetry_path: String<MAX_PATH_LEN>,
    /// Metrics write API key
    pub telemetry_api_key: String<MAX_KEY_LEN>,
    /// Notification server host
    pub notify_host: String<MAX_HOST_LEN>,
    /// Notification script path
    pub notify_path: String<MAX_PATH_LEN>,
    /// Author shown on notifications
    pub author: String<MAX_KEY_LEN>,
    /// Shared secret for the notification service
    pub secret_key: String<MAX_KEY_LEN>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            telemetry_host: str_or_empty("api.thingspeak.com"),
            telemetry_path: str_or_empty("/update"),
            telemetry_api_key: String::new(),
            notify_host: String::new(),
            notify_path: String::new(),
            author: str_or_empty("thawbox"),
            secret_key: String::new(),
        }
    }
}

impl NetworkConfig {
    /// True if WiFi credentials are present
    pub fn is_online(&self) -> bool {
        !self.wifi_ssid.is_empty()
    }

    /// True if completion notifications can be sent
    pub fn notifications_enabled(&self) -> bool {
        !self.notify_host.is_empty() && !self.notify_path.is_empty()
    }
}

fn str_or_empty<const N: usize>(s: &str) -> String<N> {
    String::try_from(s).unwrap_or_default()
}

/// Complete configuration of one experiment box
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxConfig {
    pub physics: PhysicalConstants,
    pub ice: IceConfig,
    pub container: ContainerConfig,
    pub timing: TimingConfig,
    pub pins: PinAssignments,
    pub network: NetworkConfig,
}
