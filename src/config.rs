//! System configuration parameters
//!
//! Everything the pipeline needs to know about *where* the value lives and
//! *how* to display it. The core treats this as immutable input; it is
//! loaded once at boot through [`ConfigPort`](crate::app::ports::ConfigPort)
//! and validated before use.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::extract::key_path::KeyPath;

/// Verbose-output toggles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugFlags {
    /// Log WiFi driver diagnostics after association.
    pub show_wifi_diagnostics: bool,
    /// Log every HTTP response header line.
    pub show_http_headers: bool,
    /// Log the captured response body.
    pub show_payload: bool,
    /// Log each servo sweep.
    pub show_servo_moves: bool,
}

/// Core gauge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaugeConfig {
    // --- Identity ---
    pub device_name: heapless::String<32>,

    // --- WiFi ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,

    // --- Endpoint ---
    /// Remote host name (no scheme).
    pub host: String,
    /// TCP port (plain HTTP).
    pub port: u16,
    /// API base path, e.g. `/api/v1`.
    pub base_path: String,
    /// Resource path appended to `base_path`.
    pub endpoint: String,
    /// Locator of the displayed value inside the JSON body.
    pub key_path: String,

    // --- Display ---
    /// Value mapped to 0°.
    pub display_low: f64,
    /// Value mapped to 180°.
    pub display_high: f64,
    /// Servo sweep rate in degrees per second (1-360).
    pub servo_speed_dps: u16,

    // --- Timing ---
    /// Delay between poll cycles (milliseconds).
    pub poll_interval_ms: u32,
    /// Deadline for receiving a whole HTTP response (milliseconds).
    pub read_timeout_ms: u32,

    pub debug: DebugFlags,
}

fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    heapless::String::try_from(s).unwrap_or_default()
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            device_name: fixed("pudding"),

            wifi_ssid: fixed(option_env!("GAUGE_WIFI_SSID").unwrap_or("")),
            wifi_password: fixed(option_env!("GAUGE_WIFI_PASS").unwrap_or("")),

            host: "isenseproject.org".into(),
            port: 80,
            base_path: "/api/v1".into(),
            endpoint: "/projects/1283".into(),
            key_path: "dataSetCount".into(),

            display_low: 1600.0,
            display_high: 1700.0,
            servo_speed_dps: 90,

            poll_interval_ms: 60_000, // 1/min
            read_timeout_ms: 10_000,

            debug: DebugFlags {
                show_payload: true,
                ..DebugFlags::default()
            },
        }
    }
}

impl GaugeConfig {
    /// Range-check every field. Invalid configs are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        DisplayBounds::new(self.display_low, self.display_high)?;
        if self.host.is_empty() {
            return Err(ConfigError::ValidationFailed("host must not be empty"));
        }
        if self.port == 0 {
            return Err(ConfigError::ValidationFailed("port must be 1-65535"));
        }
        if !self.base_path.starts_with('/') && !self.base_path.is_empty() {
            return Err(ConfigError::ValidationFailed("base_path must start with '/'"));
        }
        if !self.endpoint.starts_with('/') {
            return Err(ConfigError::ValidationFailed("endpoint must start with '/'"));
        }
        self.parsed_key_path()?;
        if !(1..=360).contains(&self.servo_speed_dps) {
            return Err(ConfigError::ValidationFailed("servo_speed_dps must be 1-360"));
        }
        if !(1_000..=3_600_000).contains(&self.poll_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "poll_interval_ms must be 1000-3600000",
            ));
        }
        if !(100..=60_000).contains(&self.read_timeout_ms) {
            return Err(ConfigError::ValidationFailed("read_timeout_ms must be 100-60000"));
        }
        Ok(())
    }

    /// Display bounds as a validated value.
    pub fn bounds(&self) -> Result<DisplayBounds, ConfigError> {
        DisplayBounds::new(self.display_low, self.display_high)
    }

    pub fn parsed_key_path(&self) -> Result<KeyPath, ConfigError> {
        KeyPath::parse(&self.key_path)
            .ok_or(ConfigError::ValidationFailed("key_path must name at least one key"))
    }
}

/// The `[low, high]` range mapped linearly onto 0-180° of arm travel.
///
/// Only constructible with `low < high`, so the mapping never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayBounds {
    low: f64,
    high: f64,
}

impl DisplayBounds {
    pub fn new(low: f64, high: f64) -> Result<Self, ConfigError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(ConfigError::ValidationFailed("display bounds must be finite"));
        }
        if low >= high {
            return Err(ConfigError::ValidationFailed(
                "display_low must be < display_high",
            ));
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}
