//! WiFi station-mode adapter.
//!
//! Implements [`NetworkPort`], the raw station view the
//! [`ConnectivityManager`](crate::net::connectivity::ConnectivityManager)
//! builds its policy on.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver calls via `esp_idf_svc::wifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! `begin` is non-blocking on both: association and DHCP finish in the
//! background and are observed through `is_transport_connected` / `local_ip`.

use std::net::Ipv4Addr;

use log::info;
#[cfg(target_os = "espidf")]
use log::{error, warn};

use crate::app::ports::NetworkPort;
use crate::error::ConnectivityError;

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConnectivityError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

/// Online checks the simulated station needs before it reports a link.
#[cfg(not(target_os = "espidf"))]
pub const SIM_ASSOCIATION_POLLS: u32 = 3;

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    begun: bool,
    #[cfg(target_os = "espidf")]
    wifi: esp_idf_svc::wifi::EspWifi<'static>,
    /// Simulation: online checks answered so far.
    #[cfg(not(target_os = "espidf"))]
    sim_checks: core::cell::Cell<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_association_polls: Option<u32>,
    #[cfg(not(target_os = "espidf"))]
    sim_link_up: bool,
}

impl WifiAdapter {
    #[cfg(target_os = "espidf")]
    pub fn new(wifi: esp_idf_svc::wifi::EspWifi<'static>) -> Self {
        Self {
            ssid: heapless::String::new(),
            begun: false,
            wifi,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            ssid: heapless::String::new(),
            begun: false,
            sim_checks: core::cell::Cell::new(0),
            sim_association_polls: Some(SIM_ASSOCIATION_POLLS),
            sim_link_up: true,
        }
    }

    /// Simulation: `None` means the access point never answers.
    #[cfg(not(target_os = "espidf"))]
    pub fn with_association_polls(mut self, polls: Option<u32>) -> Self {
        self.sim_association_polls = polls;
        self
    }

    /// Simulation: drop or restore the link after association.
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_link(&mut self, up: bool) {
        self.sim_link_up = up;
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPAWPA2Personal
        };
        let config = Configuration::Client(ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: password
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&config).map_err(|e| {
            error!("WiFi(espidf): set_configuration failed: {}", e);
            ConnectivityError::DriverFailed
        })?;
        self.wifi.start().map_err(|e| {
            error!("WiFi(espidf): start failed: {}", e);
            ConnectivityError::DriverFailed
        })?;
        // Non-blocking: the event loop finishes association and DHCP.
        if let Err(e) = self.wifi.connect() {
            warn!("WiFi(espidf): connect request failed: {}", e);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self, ssid: &str, _password: &str) -> Result<(), ConnectivityError> {
        info!("WiFi(sim): associating with '{}'", ssid);
        self.sim_checks.set(0);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_connected(&self) -> bool {
        let n = self.sim_checks.get();
        self.sim_checks.set(n.saturating_add(1));
        self.sim_link_up && self.sim_association_polls.is_some_and(|after| n >= after)
    }

    #[cfg(target_os = "espidf")]
    fn platform_local_ip(&self) -> Ipv4Addr {
        self.wifi
            .sta_netif()
            .get_ip_info()
            .map(|info| info.ip)
            .unwrap_or(Ipv4Addr::UNSPECIFIED)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_local_ip(&self) -> Ipv4Addr {
        let associated = self
            .sim_association_polls
            .is_some_and(|after| self.sim_checks.get() > after);
        if self.sim_link_up && associated {
            Ipv4Addr::new(192, 168, 4, 2)
        } else {
            Ipv4Addr::UNSPECIFIED
        }
    }

    #[cfg(target_os = "espidf")]
    fn platform_rssi(&self) -> Option<i8> {
        let mut ap_info = esp_idf_svc::sys::wifi_ap_record_t::default();
        // SAFETY: ap_info is a valid out-pointer; the driver is started.
        let ret = unsafe { esp_idf_svc::sys::esp_wifi_sta_get_ap_info(&mut ap_info) };
        if ret == esp_idf_svc::sys::ESP_OK as i32 {
            Some(ap_info.rssi)
        } else {
            None
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_rssi(&self) -> Option<i8> {
        if self.platform_local_ip() == Ipv4Addr::UNSPECIFIED {
            return None;
        }
        Some(-60)
    }
}

// ───────────────────────────────────────────────────────────────
// NetworkPort
// ───────────────────────────────────────────────────────────────

impl NetworkPort for WifiAdapter {
    fn begin(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid
            .push_str(ssid)
            .map_err(|_| ConnectivityError::InvalidSsid)?;
        self.platform_begin(ssid, password)?;
        self.begun = true;
        info!("WiFi: association started (SSID='{}')", self.ssid);
        Ok(())
    }

    fn is_transport_connected(&self) -> bool {
        self.begun && self.platform_is_connected()
    }

    fn local_ip(&self) -> Ipv4Addr {
        if !self.begun {
            return Ipv4Addr::UNSPECIFIED;
        }
        self.platform_local_ip()
    }

    fn rssi(&self) -> Option<i8> {
        if !self.begun {
            return None;
        }
        self.platform_rssi()
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
