//! Mock adapters for integration tests.
//!
//! Records every port call so tests can assert on the full history
//! without touching real GPIO/PWM registers or sockets.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Cursor, Read, Write};
use std::net::Ipv4Addr;
use std::rc::Rc;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use gaugearm::app::events::AppEvent;
use gaugearm::app::ports::{
    ConfigPort, Connector, EventSink, Indicator, IndicatorPort, NetworkPort, ServoPort,
};
use gaugearm::config::GaugeConfig;
use gaugearm::error::{ConfigError, ConnectivityError};

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    Indicator(Indicator, bool),
    Servo(u8),
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockHardware {
    pub calls: Vec<HwCall>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn servo_writes(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HwCall::Servo(a) => Some(*a),
                HwCall::Indicator(..) => None,
            })
            .collect()
    }

    pub fn last_servo(&self) -> Option<u8> {
        self.servo_writes().last().copied()
    }

    pub fn indicator(&self, which: Indicator) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                HwCall::Indicator(w, on) if *w == which => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl IndicatorPort for MockHardware {
    fn set_indicator(&mut self, which: Indicator, on: bool) {
        self.calls.push(HwCall::Indicator(which, on));
    }
}

impl ServoPort for MockHardware {
    fn write_angle(&mut self, degrees: u8) {
        self.calls.push(HwCall::Servo(degrees));
    }
}

// ── MockClock ─────────────────────────────────────────────────

/// Accumulates requested delay without sleeping.
#[derive(Default)]
pub struct MockClock {
    pub elapsed_ms: u64,
}

impl DelayNs for MockClock {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ms += u64::from(ns) / 1_000_000;
    }

    fn delay_ms(&mut self, ms: u32) {
        self.elapsed_ms += u64::from(ms);
    }
}

// ── MockNetwork ───────────────────────────────────────────────

pub struct MockNetwork {
    pub begin_calls: u32,
    /// Online checks before the link reports up. `None` = never.
    pub online_after: Option<u32>,
    pub checks: Cell<u32>,
    pub link_up: bool,
    pub ip: Ipv4Addr,
    pub reject: Option<ConnectivityError>,
}

#[allow(dead_code)]
impl MockNetwork {
    /// Comes up on the first check.
    pub fn online() -> Self {
        Self::online_after(0)
    }

    pub fn online_after(checks: u32) -> Self {
        Self {
            begin_calls: 0,
            online_after: Some(checks),
            checks: Cell::new(0),
            link_up: true,
            ip: Ipv4Addr::new(192, 168, 1, 50),
            reject: None,
        }
    }

    pub fn never_online() -> Self {
        Self {
            online_after: None,
            ..Self::online()
        }
    }
}

impl NetworkPort for MockNetwork {
    fn begin(&mut self, _ssid: &str, _password: &str) -> Result<(), ConnectivityError> {
        self.begin_calls += 1;
        match self.reject {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn is_transport_connected(&self) -> bool {
        let n = self.checks.get();
        self.checks.set(n + 1);
        self.link_up && self.online_after.is_some_and(|after| n >= after)
    }

    fn local_ip(&self) -> Ipv4Addr {
        self.ip
    }

    fn rssi(&self) -> Option<i8> {
        Some(-55)
    }
}

// ── MockConnector ─────────────────────────────────────────────

pub struct MockStream {
    input: Cursor<Vec<u8>>,
    written: Rc<RefCell<Vec<u8>>>,
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serves queued responses, one per `open`. An empty queue refuses.
#[derive(Default)]
pub struct MockConnector {
    pub responses: VecDeque<String>,
    pub opens: Vec<(String, u16, Duration)>,
    pub written: Rc<RefCell<Vec<u8>>>,
}

#[allow(dead_code)]
impl MockConnector {
    pub fn with(responses: &[&str]) -> Self {
        Self {
            responses: responses.iter().map(|s| (*s).to_owned()).collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, response: &str) {
        self.responses.push_back(response.to_owned());
    }

    pub fn requests(&self) -> String {
        String::from_utf8_lossy(&self.written.borrow()).into_owned()
    }
}

impl Connector for MockConnector {
    type Stream = MockStream;

    fn open(&mut self, host: &str, port: u16, timeout: Duration) -> io::Result<MockStream> {
        self.opens.push((host.to_owned(), port, timeout));
        let response = self
            .responses
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))?;
        Ok(MockStream {
            input: Cursor::new(response.into_bytes()),
            written: Rc::clone(&self.written),
        })
    }
}

/// HTTP 200 reply carrying `body` the way the gauge's server frames it.
pub fn ok_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\n\r\n{:x}\r\n{}\r\n0\r\n\r\n",
        body.len(),
        body
    )
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── MockConfigStore ───────────────────────────────────────────

#[derive(Default)]
pub struct MockConfigStore {
    pub stored: RefCell<Option<GaugeConfig>>,
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<GaugeConfig, ConfigError> {
        let cfg = self.stored.borrow().clone().unwrap_or_default();
        cfg.validate()?;
        Ok(cfg)
    }

    fn save(&self, config: &GaugeConfig) -> Result<(), ConfigError> {
        config.validate()?;
        *self.stored.borrow_mut() = Some(config.clone());
        Ok(())
    }
}
