//! WiFi association policy.
//!
//! The first [`ConnectivityManager::connect`] call starts association and
//! blocks for a bounded window while the activity LED blinks. Every later
//! call only re-derives the state from the station; a dropped link is
//! reported as `Disconnected` and never forcibly re-associated.
//!
//! ```text
//!  NeverAttempted ──connect──▶ Connecting ──online──▶ Connected ◀──▶ Disconnected
//!                                  │
//!                                  └──timeout / rejected──▶ Failed (terminal)
//! ```

use std::net::Ipv4Addr;

use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use crate::app::ports::{Indicator, IndicatorPort, NetworkPort};

/// Interval between online checks during the initial wait.
pub const POLL_INTERVAL_MS: u32 = 500;
/// Online checks before giving up (30 s total).
pub const MAX_POLLS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    NeverAttempted,
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NeverAttempted => "NeverAttempted",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
            Self::Failed => "Failed",
        }
    }
}

impl core::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ConnectivityManager {
    state: ConnectionState,
    /// Online checks spent in the initial wait.
    wait_polls: u32,
}

impl Default for ConnectivityManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityManager {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::NeverAttempted,
            wait_polls: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn wait_polls(&self) -> u32 {
        self.wait_polls
    }

    /// `true` once association was attempted and the station has both a
    /// link and a non-zero address.
    pub fn is_online(&self, net: &impl NetworkPort) -> bool {
        self.state != ConnectionState::NeverAttempted
            && net.is_transport_connected()
            && net.local_ip() != Ipv4Addr::UNSPECIFIED
    }

    /// Bring the link up on first use, otherwise re-derive the state.
    pub fn connect(
        &mut self,
        net: &mut impl NetworkPort,
        indicator: &mut impl IndicatorPort,
        delay: &mut impl DelayNs,
        ssid: &str,
        password: &str,
    ) -> ConnectionState {
        match self.state {
            ConnectionState::Failed => ConnectionState::Failed,
            ConnectionState::NeverAttempted => {
                self.first_connect(net, indicator, delay, ssid, password)
            }
            _ => self.refresh(net, indicator),
        }
    }

    fn first_connect(
        &mut self,
        net: &mut impl NetworkPort,
        indicator: &mut impl IndicatorPort,
        delay: &mut impl DelayNs,
        ssid: &str,
        password: &str,
    ) -> ConnectionState {
        info!("WiFi: connecting to '{}'", ssid);
        self.state = ConnectionState::Connecting;

        if let Err(e) = net.begin(ssid, password) {
            error!("WiFi: association rejected: {}", e);
            self.state = ConnectionState::Failed;
            return self.state;
        }

        let mut blink = false;
        while !self.is_online(net) {
            if self.wait_polls >= MAX_POLLS {
                error!(
                    "WiFi: not online after {} ms, giving up",
                    MAX_POLLS * POLL_INTERVAL_MS
                );
                indicator.set_indicator(Indicator::Activity, false);
                self.state = ConnectionState::Failed;
                return self.state;
            }
            blink = !blink;
            indicator.set_indicator(Indicator::Activity, blink);
            delay.delay_ms(POLL_INTERVAL_MS);
            self.wait_polls += 1;
            debug!("WiFi: waiting ({}/{})", self.wait_polls, MAX_POLLS);
        }

        info!(
            "WiFi: connected, ip={} rssi={:?}",
            net.local_ip(),
            net.rssi()
        );
        indicator.set_indicator(Indicator::Network, true);
        indicator.set_indicator(Indicator::Activity, false);
        self.state = ConnectionState::Connected;
        self.state
    }

    fn refresh(
        &mut self,
        net: &impl NetworkPort,
        indicator: &mut impl IndicatorPort,
    ) -> ConnectionState {
        let online = self.is_online(net);
        let next = if online {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        };
        if next != self.state {
            if online {
                info!("WiFi: link restored, ip={}", net.local_ip());
            } else {
                warn!("WiFi: link lost");
            }
        }
        indicator.set_indicator(Indicator::Network, online);
        self.state = next;
        self.state
    }
}
