//! Port traits: the hexagonal boundary between the pipeline and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ GaugeService (domain)
//! ```
//!
//! Driven adapters (WiFi, TCP, LEDs, servo, event sinks, config storage)
//! implement these traits. The [`GaugeService`](super::service::GaugeService)
//! consumes them via generics, so the pipeline never touches hardware directly.
//! Blocking waits go through [`embedded_hal::delay::DelayNs`].

use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::config::GaugeConfig;
use crate::error::{ConfigError, ConnectivityError};

// ───────────────────────────────────────────────────────────────
// Network port (driven adapter: WiFi station)
// ───────────────────────────────────────────────────────────────

/// Raw view of the WiFi station. Association policy lives in
/// [`ConnectivityManager`](crate::net::connectivity::ConnectivityManager).
pub trait NetworkPort {
    /// Start associating with the given network. Returns immediately.
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError>;

    /// Whether the link layer reports an association.
    fn is_transport_connected(&self) -> bool;

    /// Current station address; `0.0.0.0` until DHCP completes.
    fn local_ip(&self) -> Ipv4Addr;

    /// Signal strength of the current association, if known.
    fn rssi(&self) -> Option<i8>;
}

// ───────────────────────────────────────────────────────────────
// Connector port (driven adapter: TCP client)
// ───────────────────────────────────────────────────────────────

/// Opens byte streams to a remote host.
pub trait Connector {
    type Stream: io::Read + io::Write;

    /// Open a connection to `host:port`. `timeout` bounds the connect and
    /// every subsequent read/write on the returned stream.
    fn open(&mut self, host: &str, port: u16, timeout: Duration) -> io::Result<Self::Stream>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: status LEDs)
// ───────────────────────────────────────────────────────────────

/// The two status channels on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// Lit while associated with the network.
    Network,
    /// Lit while the arm moves; blinks during association.
    Activity,
}

pub trait IndicatorPort {
    fn set_indicator(&mut self, which: Indicator, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Servo port (driven adapter: angular actuator)
// ───────────────────────────────────────────────────────────────

/// Angular actuator accepting absolute positions in `[0, 180]`.
pub trait ServoPort {
    fn write_angle(&mut self, degrees: u8);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists gauge configuration.
///
/// Implementations MUST validate on both load and save: display bounds
/// with `low >= high` are rejected here so the angle mapping never sees them.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`GaugeConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<GaugeConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &GaugeConfig) -> Result<(), ConfigError>;
}
