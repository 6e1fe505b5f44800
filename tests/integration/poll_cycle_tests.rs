//! End-to-end tests for `GaugeService::poll_cycle` against mock adapters.

use gaugearm::app::events::{AppEvent, InvalidReason};
use gaugearm::app::ports::{ConfigPort, Indicator};
use gaugearm::app::service::{CycleOutcome, GaugeService};
use gaugearm::config::GaugeConfig;
use gaugearm::extract::ExtractSource;
use gaugearm::net::connectivity::ConnectionState;
use gaugearm::net::fetcher::FetchOutcome;

use crate::mock_hw::{
    MockClock, MockConfigStore, MockConnector, MockHardware, MockNetwork, RecordingSink,
    ok_response,
};

// ── Helpers ───────────────────────────────────────────────────

fn config() -> GaugeConfig {
    let mut cfg = GaugeConfig::default();
    cfg.wifi_ssid = heapless::String::try_from("HomeWiFi").unwrap();
    cfg.wifi_password = heapless::String::try_from("hunter2pass").unwrap();
    cfg
}

struct Rig {
    svc: GaugeService,
    net: MockNetwork,
    conn: MockConnector,
    hw: MockHardware,
    clock: MockClock,
    sink: RecordingSink,
}

impl Rig {
    fn new(responses: &[&str]) -> Self {
        Self {
            svc: GaugeService::new(&config()).unwrap(),
            net: MockNetwork::online(),
            conn: MockConnector::with(responses),
            hw: MockHardware::new(),
            clock: MockClock::default(),
            sink: RecordingSink::default(),
        }
    }

    fn cycle(&mut self) -> CycleOutcome {
        self.svc.poll_cycle(
            &mut self.net,
            &mut self.conn,
            &mut self.hw,
            &mut self.clock,
            &mut self.sink,
        )
    }
}

// ── Happy path ────────────────────────────────────────────────

#[test]
fn midpoint_value_holds_arm_at_centre() {
    let body = ok_response(r#"{"dataSetCount":1650}"#);
    let mut rig = Rig::new(&[&body]);

    let outcome = rig.cycle();
    assert_eq!(
        outcome,
        CycleOutcome::Displayed {
            value: 1650.0,
            angle: 90
        }
    );
    assert_eq!(rig.svc.current_angle(), 90);
    assert!(rig.hw.servo_writes().is_empty(), "no sweep when already there");
    assert_eq!(rig.svc.connection_state(), ConnectionState::Connected);
    assert!(rig.hw.indicator(Indicator::Network));

    let last = rig.svc.last_value();
    assert!(last.present);
    assert_eq!(last.raw, "1650");
    assert_eq!(last.source, Some(ExtractSource::Json));
}

#[test]
fn request_targets_configured_resource() {
    let body = ok_response(r#"{"dataSetCount":1650}"#);
    let mut rig = Rig::new(&[&body]);
    rig.cycle();

    assert_eq!(rig.conn.opens.len(), 1);
    let (host, port, _) = &rig.conn.opens[0];
    assert_eq!((host.as_str(), *port), ("isenseproject.org", 80));
    assert!(
        rig.conn
            .requests()
            .starts_with("GET /api/v1/projects/1283 HTTP/1.1\r\nHost: isenseproject.org\r\n")
    );
}

#[test]
fn new_value_sweeps_one_degree_per_step() {
    let body = ok_response(r#"{"dataSetCount":1625}"#);
    let mut rig = Rig::new(&[&body]);

    assert_eq!(
        rig.cycle(),
        CycleOutcome::Displayed {
            value: 1625.0,
            angle: 45
        }
    );
    let writes = rig.hw.servo_writes();
    assert_eq!(writes.len(), 45);
    assert_eq!(writes.first(), Some(&89));
    assert_eq!(writes.last(), Some(&45));
    assert!(writes.windows(2).all(|w| w[0] == w[1] + 1));
    // 90 °/s → 11 ms per step
    assert_eq!(rig.clock.elapsed_ms, 45 * 11);
    assert!(!rig.hw.indicator(Indicator::Activity), "activity LED off after sweep");
}

#[test]
fn repeated_value_does_not_move_arm_again() {
    let body = ok_response(r#"{"dataSetCount":1700}"#);
    let mut rig = Rig::new(&[&body, &body]);

    rig.cycle();
    let after_first = rig.hw.servo_writes().len();
    assert_eq!(after_first, 90);

    rig.cycle();
    assert_eq!(rig.hw.servo_writes().len(), after_first);
    assert_eq!(rig.svc.current_angle(), 180);
    assert_eq!(rig.svc.poll_count(), 2);
}

#[test]
fn out_of_range_values_clamp_to_travel_ends() {
    let low = ok_response(r#"{"dataSetCount":12}"#);
    let high = ok_response(r#"{"dataSetCount":99999}"#);
    let mut rig = Rig::new(&[&low, &high]);

    assert!(matches!(rig.cycle(), CycleOutcome::Displayed { angle: 0, .. }));
    assert!(matches!(rig.cycle(), CycleOutcome::Displayed { angle: 180, .. }));
}

#[test]
fn large_project_document_is_displayed() {
    let description = "lorem ipsum ".repeat(400);
    let body = format!(
        r#"{{"id":1283,"name":"pudding","description":"{description}","dataSetCount":1675,"fields":[{{"name":"x"}}]}}"#
    );
    assert!(body.len() > 4096);
    let mut rig = Rig::new(&[&ok_response(&body)]);

    assert_eq!(
        rig.cycle(),
        CycleOutcome::Displayed {
            value: 1675.0,
            angle: 135
        }
    );
    assert_eq!(rig.svc.last_value().source, Some(ExtractSource::Json));
}

#[test]
fn sibling_key_in_valid_json_is_not_displayed() {
    let mut cfg = config();
    cfg.key_path = "data.0.Temperature".into();
    let mut rig = Rig::new(&[&ok_response(
        r#"{"data":[],"meta":{"Temperature":99,"x":1}}"#,
    )]);
    rig.svc = GaugeService::new(&cfg).unwrap();

    assert_eq!(
        rig.cycle(),
        CycleOutcome::Invalidated(InvalidReason::ValueUnextractable)
    );
    assert!(rig.hw.servo_writes().is_empty());
}

#[test]
fn truncated_json_is_read_by_fallback_scan() {
    let body = ok_response(r#"{"dataSetCount":1620,"name":"pudd"#);
    let mut rig = Rig::new(&[&body]);

    assert_eq!(
        rig.cycle(),
        CycleOutcome::Displayed {
            value: 1620.0,
            angle: 36
        }
    );
    assert_eq!(rig.svc.last_value().source, Some(ExtractSource::Fallback));
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::ValueExtracted {
                source: ExtractSource::Fallback,
                ..
            }
        )),
        1
    );
}

// ── Transient failures ────────────────────────────────────────

#[test]
fn server_error_is_transient() {
    let ok = ok_response(r#"{"dataSetCount":1650}"#);
    let mut rig = Rig::new(&["HTTP/1.1 503 Service Unavailable\r\n\r\n", &ok]);

    assert_eq!(rig.cycle(), CycleOutcome::Transient(FetchOutcome::Unknown));
    assert!(rig.svc.is_valid());
    assert!(matches!(rig.cycle(), CycleOutcome::Displayed { .. }));
}

#[test]
fn refused_connection_is_transient() {
    let mut rig = Rig::new(&[]);

    assert_eq!(rig.cycle(), CycleOutcome::Transient(FetchOutcome::ConnectFailed));
    assert!(rig.svc.is_valid());
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::FetchCompleted {
            outcome: FetchOutcome::ConnectFailed,
            status_code: 0,
            ..
        }
    )));
}

#[test]
fn empty_body_yields_no_value_and_stays_valid() {
    let mut rig = Rig::new(&["HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"]);

    assert_eq!(rig.cycle(), CycleOutcome::NoValue);
    assert!(rig.svc.is_valid());
    assert!(!rig.svc.last_value().present);
    assert!(rig.hw.servo_writes().is_empty());
}

#[test]
fn dropped_link_reports_offline_then_recovers() {
    let ok = ok_response(r#"{"dataSetCount":1650}"#);
    let mut rig = Rig::new(&[&ok]);
    assert!(matches!(rig.cycle(), CycleOutcome::Displayed { .. }));

    rig.net.link_up = false;
    assert_eq!(rig.cycle(), CycleOutcome::Offline);
    assert_eq!(rig.svc.connection_state(), ConnectionState::Disconnected);
    assert!(!rig.hw.indicator(Indicator::Network));
    assert_eq!(rig.conn.opens.len(), 1, "no fetch while offline");

    rig.net.link_up = true;
    rig.conn.push(&ok);
    assert!(matches!(rig.cycle(), CycleOutcome::Displayed { .. }));
    assert_eq!(rig.net.begin_calls, 1, "never re-associates");
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ConnectionChanged { .. })),
        3
    );
}

// ── Permanent invalidation ────────────────────────────────────

#[test]
fn not_found_invalidates_device_for_good() {
    let ok = ok_response(r#"{"dataSetCount":1650}"#);
    let mut rig = Rig::new(&["HTTP/1.1 404 Not Found\r\n\r\n", &ok]);

    let outcome = rig.cycle();
    assert_eq!(
        outcome,
        CycleOutcome::Invalidated(InvalidReason::EndpointNotFound)
    );
    assert!(outcome.is_terminal(), "host loop stops polling");
    assert!(!rig.svc.is_valid());
    assert_eq!(rig.svc.invalid_reason(), Some(InvalidReason::EndpointNotFound));

    assert_eq!(rig.cycle(), CycleOutcome::Inert);
    assert_eq!(rig.cycle(), CycleOutcome::Inert);
    assert_eq!(rig.conn.opens.len(), 1, "no I/O once invalid");
    assert_eq!(rig.svc.poll_count(), 1);
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::Invalidated(_))),
        1
    );
}

#[test]
fn unextractable_payload_invalidates_device() {
    let body = ok_response(r#"{"somethingElse":3}"#);
    let mut rig = Rig::new(&[&body]);

    assert_eq!(
        rig.cycle(),
        CycleOutcome::Invalidated(InvalidReason::ValueUnextractable)
    );
    assert!(!rig.svc.last_value().present);
    assert_eq!(rig.svc.current_angle(), 90, "arm left where it was");
    assert_eq!(rig.cycle(), CycleOutcome::Inert);
}

#[test]
fn fallback_zero_that_is_not_literal_zero_invalidates() {
    let body = ok_response(r#"{"dataSetCount":"0.0","x":1"#);
    let mut rig = Rig::new(&[&body]);

    assert_eq!(
        rig.cycle(),
        CycleOutcome::Invalidated(InvalidReason::ValueUnextractable)
    );
}

// ── Connectivity failure ──────────────────────────────────────

#[test]
fn association_timeout_halts_pipeline() {
    let mut rig = Rig::new(&[]);
    rig.net = MockNetwork::never_online();

    assert_eq!(rig.cycle(), CycleOutcome::Halted);
    assert_eq!(rig.svc.connection_state(), ConnectionState::Failed);
    assert_eq!(rig.clock.elapsed_ms, 30_000);
    assert!(rig.sink.events.iter().any(|e| matches!(e, AppEvent::Halted)));

    assert_eq!(rig.cycle(), CycleOutcome::Halted);
    assert_eq!(rig.net.begin_calls, 1);
    assert!(rig.conn.opens.is_empty());
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_self_test_parks_arm_at_centre() {
    let mut rig = Rig::new(&[]);
    rig.svc.boot(&mut rig.hw, &mut rig.clock, &mut rig.sink);

    assert_eq!(rig.svc.current_angle(), 90);
    assert_eq!(rig.hw.last_servo(), Some(90));
    assert!(!rig.hw.indicator(Indicator::Network));
    assert!(!rig.hw.indicator(Indicator::Activity));
    assert!(matches!(
        rig.sink.events.last(),
        Some(AppEvent::Booted { angle: 90 })
    ));
}

// ── Config store ──────────────────────────────────────────────

#[test]
fn service_builds_from_stored_config() {
    let store = MockConfigStore::default();
    let mut cfg = config();
    cfg.display_low = 0.0;
    cfg.display_high = 100.0;
    cfg.key_path = "data.0.Temperature".into();
    store.save(&cfg).unwrap();

    let mut rig = Rig::new(&[&ok_response(r#"{"data":[{"Temperature":"25"}]}"#)]);
    rig.svc = GaugeService::new(&store.load().unwrap()).unwrap();

    assert_eq!(
        rig.cycle(),
        CycleOutcome::Displayed {
            value: 25.0,
            angle: 45
        }
    );
}

#[test]
fn store_rejects_inverted_bounds() {
    let store = MockConfigStore::default();
    let mut cfg = config();
    cfg.display_low = 50.0;
    cfg.display_high = 10.0;
    assert!(store.save(&cfg).is_err());
}
