//! Full-stack tests wiring the simulated WiFi station, the hardware
//! adapter and the log sink into the service. Only the TCP side and the
//! clock are mocked.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use gaugearm::adapters::hardware::HardwareAdapter;
use gaugearm::adapters::log_sink::LogEventSink;
use gaugearm::adapters::wifi::{SIM_ASSOCIATION_POLLS, WifiAdapter};
use gaugearm::app::ports::Indicator;
use gaugearm::app::service::{CycleOutcome, GaugeService};
use gaugearm::config::{DebugFlags, GaugeConfig};
use gaugearm::net::connectivity::{ConnectionState, POLL_INTERVAL_MS};

use crate::mock_hw::{MockClock, MockConnector, ok_response};

/// 14-bit LEDC stand-in.
struct Ledc {
    duty: u16,
}

impl ErrorType for Ledc {
    type Error = Infallible;
}

impl SetDutyCycle for Ledc {
    fn max_duty_cycle(&self) -> u16 {
        16_383
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duty = duty;
        Ok(())
    }
}

fn config(ssid: &str, password: &str) -> GaugeConfig {
    let mut cfg = GaugeConfig::default();
    cfg.wifi_ssid = heapless::String::try_from(ssid).unwrap();
    cfg.wifi_password = heapless::String::try_from(password).unwrap();
    cfg.debug = DebugFlags {
        show_wifi_diagnostics: true,
        show_http_headers: true,
        show_payload: true,
        show_servo_moves: true,
    };
    cfg
}

fn hardware() -> HardwareAdapter<Ledc> {
    HardwareAdapter::new(gaugearm::drivers::servo::ServoDriver::new(Ledc { duty: 0 }))
}

#[test]
fn sim_station_associates_then_serves_value() {
    let cfg = config("HomeWiFi", "hunter2pass");
    let mut svc = GaugeService::new(&cfg).unwrap();
    let mut wifi = WifiAdapter::new();
    let mut conn = MockConnector::with(&[&ok_response(r#"{"dataSetCount":1690}"#)]);
    let mut hw = hardware();
    let mut clock = MockClock::default();
    let mut sink = LogEventSink::new(cfg.debug);

    svc.boot(&mut hw, &mut clock, &mut sink);
    let boot_ms = clock.elapsed_ms;

    let outcome = svc.poll_cycle(&mut wifi, &mut conn, &mut hw, &mut clock, &mut sink);
    assert_eq!(
        outcome,
        CycleOutcome::Displayed {
            value: 1690.0,
            angle: 162
        }
    );
    assert_eq!(svc.connection_state(), ConnectionState::Connected);
    assert_eq!(svc.state().connectivity.wait_polls(), SIM_ASSOCIATION_POLLS);
    assert_eq!(wifi.ssid(), "HomeWiFi");
    assert!(hw.indicator(Indicator::Network));
    assert!(!hw.indicator(Indicator::Activity));
    assert_eq!(hw.servo_angle(), Some(162));

    let association_ms = u64::from(SIM_ASSOCIATION_POLLS * POLL_INTERVAL_MS);
    let sweep_ms = 72 * 11;
    assert_eq!(clock.elapsed_ms - boot_ms, association_ms + sweep_ms);
}

#[test]
fn unreachable_access_point_halts() {
    let cfg = config("Nowhere", "hunter2pass");
    let mut svc = GaugeService::new(&cfg).unwrap();
    let mut wifi = WifiAdapter::new().with_association_polls(None);
    let mut conn = MockConnector::default();
    let mut hw = hardware();
    let mut clock = MockClock::default();
    let mut sink = LogEventSink::new(cfg.debug);

    let outcome = svc.poll_cycle(&mut wifi, &mut conn, &mut hw, &mut clock, &mut sink);
    assert_eq!(outcome, CycleOutcome::Halted);
    assert!(!hw.indicator(Indicator::Network));
    assert!(!hw.indicator(Indicator::Activity));
    assert!(conn.opens.is_empty());
}

#[test]
fn malformed_credentials_halt_without_waiting() {
    let cfg = config("", "");
    let mut svc = GaugeService::new(&cfg).unwrap();
    let mut wifi = WifiAdapter::new();
    let mut conn = MockConnector::default();
    let mut hw = hardware();
    let mut clock = MockClock::default();
    let mut sink = LogEventSink::new(cfg.debug);

    let outcome = svc.poll_cycle(&mut wifi, &mut conn, &mut hw, &mut clock, &mut sink);
    assert_eq!(outcome, CycleOutcome::Halted);
    assert_eq!(clock.elapsed_ms, 0);
}

#[test]
fn link_loss_is_observed_not_repaired() {
    let cfg = config("HomeWiFi", "hunter2pass");
    let mut svc = GaugeService::new(&cfg).unwrap();
    let mut wifi = WifiAdapter::new().with_association_polls(Some(0));
    let body = ok_response(r#"{"dataSetCount":1650}"#);
    let mut conn = MockConnector::with(&[&body, &body]);
    let mut hw = hardware();
    let mut clock = MockClock::default();
    let mut sink = LogEventSink::new(cfg.debug);

    assert!(matches!(
        svc.poll_cycle(&mut wifi, &mut conn, &mut hw, &mut clock, &mut sink),
        CycleOutcome::Displayed { .. }
    ));

    wifi.set_sim_link(false);
    assert_eq!(
        svc.poll_cycle(&mut wifi, &mut conn, &mut hw, &mut clock, &mut sink),
        CycleOutcome::Offline
    );
    assert!(!hw.indicator(Indicator::Network));

    wifi.set_sim_link(true);
    assert!(matches!(
        svc.poll_cycle(&mut wifi, &mut conn, &mut hw, &mut clock, &mut sink),
        CycleOutcome::Displayed { angle: 90, .. }
    ));
    assert!(hw.indicator(Indicator::Network));
}
