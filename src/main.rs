//! GaugeArm Firmware: Main Entry Point
//!
//! Hexagonal architecture with a single blocking poll loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter   LogEventSink   NvsAdapter   Esp32Time       │
//! │  (Indicator+Servo) (EventSink)    (Config)     (DelayNs)       │
//! │  WifiAdapter       TcpConnector                                │
//! │  (NetworkPort)     (Connector)                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             GaugeService (pure logic)                  │    │
//! │  │  connect · fetch · extract · map · sweep               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use embedded_hal::delay::DelayNs;
use log::{debug, error, info, warn};

use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::prelude::*;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use gaugearm::adapters::hardware::HardwareAdapter;
use gaugearm::adapters::log_sink::LogEventSink;
use gaugearm::adapters::nvs::NvsAdapter;
use gaugearm::adapters::tcp::TcpConnector;
use gaugearm::adapters::time::Esp32TimeAdapter;
use gaugearm::adapters::wifi::WifiAdapter;
use gaugearm::app::ports::{ConfigPort, NetworkPort};
use gaugearm::app::service::{CycleOutcome, GaugeService};
use gaugearm::config::GaugeConfig;
use gaugearm::control::indicator::DiagnosticFlash;
use gaugearm::drivers::hw_init;
use gaugearm::drivers::servo::ServoDriver;
use gaugearm::error::HwInitError;
use gaugearm::net::connectivity::ConnectionState;
use gaugearm::pins;

/// Wake interval while parked after invalidation.
const PARKED_WAKE_MS: u32 = 60_000;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GaugeArm v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let nvs = NvsAdapter::new()?;
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            GaugeConfig::default()
        }
    };
    info!(
        "Config: device='{}' target=http://{}:{}{}{} key='{}' range=[{}, {}]",
        config.device_name,
        config.host,
        config.port,
        config.base_path,
        config.endpoint,
        config.key_path,
        config.display_low,
        config.display_high,
    );

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    let servo_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(pins::SERVO_PWM_FREQ_HZ.Hz())
            .resolution(Resolution::Bits14),
    )
    .map_err(|_| HwInitError::LedcInitFailed)?;
    let servo_channel = LedcDriver::new(peripherals.ledc.channel0, servo_timer, peripherals.pins.gpio14)
        .map_err(|_| HwInitError::LedcInitFailed)?;
    info!("Servo on GPIO{} at {} Hz", pins::SERVO_GPIO, pins::SERVO_PWM_FREQ_HZ);

    let mut hw = HardwareAdapter::new(ServoDriver::new(servo_channel));
    let mut wifi = WifiAdapter::new(EspWifi::new(peripherals.modem, sysloop, Some(nvs_partition))?);
    let mut tcp = TcpConnector::new();
    let mut clock = Esp32TimeAdapter::new();
    let mut sink = LogEventSink::new(config.debug);

    // ── 4. Service + boot self-test ───────────────────────────
    let mut service = GaugeService::new(&config)?;
    service.boot(&mut hw, &mut clock, &mut sink);

    // ── 5. Poll loop ──────────────────────────────────────────
    let mut wifi_diagnostics_logged = false;
    loop {
        let outcome = service.poll_cycle(&mut wifi, &mut tcp, &mut hw, &mut clock, &mut sink);

        if config.debug.show_wifi_diagnostics
            && !wifi_diagnostics_logged
            && service.connection_state() == ConnectionState::Connected
        {
            info!(
                "WiFi diagnostics: ssid='{}' ip={} rssi={:?}",
                wifi.ssid(),
                wifi.local_ip(),
                wifi.rssi()
            );
            wifi_diagnostics_logged = true;
        }

        match outcome {
            CycleOutcome::Displayed { value, angle } => {
                info!(
                    "Poll #{}: {} -> {}\u{00b0} (uptime {} s)",
                    service.poll_count(),
                    value,
                    angle,
                    clock.uptime_ms() / 1000
                );
            }
            other if other.is_terminal() => break,
            other => debug!("Poll #{}: {:?}", service.poll_count(), other),
        }

        clock.delay_ms(config.poll_interval_ms);
    }

    // ── 6. Terminal states ────────────────────────────────────
    if let Some(reason) = service.invalid_reason() {
        warn!(
            "Device invalid ({:?}), polling stopped with arm at {}\u{00b0}; fix the config and reset",
            reason,
            service.current_angle()
        );
        loop {
            clock.delay_ms(PARKED_WAKE_MS);
        }
    }

    error!("Connectivity failed, flashing diagnostic pattern until reset");
    hw.all_off();
    let mut flash = DiagnosticFlash::new();
    loop {
        let hold_ms = flash.step(&mut hw);
        clock.delay_ms(hold_ms);
    }
}
