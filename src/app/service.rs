//! Application service: the hexagonal core.
//!
//! [`GaugeService`] owns every piece of mutable device state and runs the
//! acquisition-and-display pipeline once per call to
//! [`poll_cycle`](GaugeService::poll_cycle). All I/O flows through port
//! traits injected at call sites, so the whole pipeline is testable with
//! mock adapters.
//!
//! ```text
//!  NetworkPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!    Connector ──▶ │          GaugeService        │
//!                  │ connect · fetch · extract    │
//! IndicatorPort ◀──│ · map · sweep                │
//!     ServoPort ◀──└──────────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::{DebugFlags, DisplayBounds, GaugeConfig};
use crate::control::actuator::{self, ActuatorController};
use crate::control::indicator;
use crate::error::{ConfigError, ExtractError};
use crate::extract::key_path::KeyPath;
use crate::extract::{self, ExtractedValue};
use crate::net::connectivity::{ConnectionState, ConnectivityManager};
use crate::net::fetcher::{self, FetchOutcome, FetchRequest};

use super::events::{AppEvent, InvalidReason};
use super::ports::{Connector, EventSink, IndicatorPort, NetworkPort, ServoPort};

// ───────────────────────────────────────────────────────────────
// Device state
// ───────────────────────────────────────────────────────────────

/// Everything that survives from one poll cycle to the next.
pub struct DeviceState {
    pub connectivity: ConnectivityManager,
    pub actuator: ActuatorController,
    /// Cleared for good on 404 or an unextractable payload.
    pub valid: bool,
    pub invalid_reason: Option<InvalidReason>,
    pub last_value: ExtractedValue,
    pub poll_count: u64,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            connectivity: ConnectivityManager::new(),
            actuator: ActuatorController::new(),
            valid: true,
            invalid_reason: None,
            last_value: ExtractedValue::absent(),
            poll_count: 0,
        }
    }
}

/// What one [`GaugeService::poll_cycle`] call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// A value was extracted and the arm now shows it.
    Displayed { value: f64, angle: u8 },
    /// Link down; nothing fetched.
    Offline,
    /// The fetch did not succeed; retry next cycle.
    Transient(FetchOutcome),
    /// The response carried no body to extract from.
    NoValue,
    /// This cycle made the device permanently invalid.
    Invalidated(InvalidReason),
    /// The device was already invalid; no I/O performed.
    Inert,
    /// Connectivity failed for good; the host loop takes over.
    Halted,
}

impl CycleOutcome {
    /// No later cycle can do anything useful: the device is invalid or the
    /// network never came up.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Invalidated(_) | Self::Inert | Self::Halted)
    }
}

// ───────────────────────────────────────────────────────────────
// GaugeService
// ───────────────────────────────────────────────────────────────

pub struct GaugeService {
    state: DeviceState,
    request: FetchRequest,
    key_path: KeyPath,
    bounds: DisplayBounds,
    speed_dps: i32,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    debug: DebugFlags,
}

impl GaugeService {
    /// Build the service from a configuration, validating it first.
    pub fn new(config: &GaugeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state: DeviceState::default(),
            request: FetchRequest::from_config(config),
            key_path: config.parsed_key_path()?,
            bounds: config.bounds()?,
            speed_dps: i32::from(config.servo_speed_dps),
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            debug: config.debug,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Park the arm at centre and run the power-on self-test.
    pub fn boot(
        &mut self,
        hw: &mut (impl IndicatorPort + ServoPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) {
        self.state.actuator.sync(hw);
        indicator::run_boot_sequence(hw, &mut self.state.actuator, delay);
        let angle = self.state.actuator.current_angle();
        sink.emit(&AppEvent::Booted { angle });
        info!("GaugeService booted, arm at {}", angle);
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one cycle: connect → fetch → extract → map → sweep.
    pub fn poll_cycle(
        &mut self,
        net: &mut impl NetworkPort,
        connector: &mut impl Connector,
        hw: &mut (impl IndicatorPort + ServoPort),
        delay: &mut impl DelayNs,
        sink: &mut impl EventSink,
    ) -> CycleOutcome {
        if !self.state.valid {
            debug!("poll: device invalid, skipping");
            return CycleOutcome::Inert;
        }
        self.state.poll_count += 1;

        // 1. Connectivity
        let prev = self.state.connectivity.state();
        let now = self.state.connectivity.connect(
            net,
            hw,
            delay,
            self.ssid.as_str(),
            self.password.as_str(),
        );
        if now != prev {
            sink.emit(&AppEvent::ConnectionChanged { from: prev, to: now });
        }
        match now {
            ConnectionState::Connected => {}
            ConnectionState::Failed => {
                sink.emit(&AppEvent::Halted);
                return CycleOutcome::Halted;
            }
            _ => return CycleOutcome::Offline,
        }

        // 2. Fetch
        let result = fetcher::fetch(connector, &self.request, self.debug.show_http_headers);
        sink.emit(&AppEvent::FetchCompleted {
            status_code: result.status_code,
            outcome: result.outcome,
            body_len: result.body.len(),
        });
        if result.invalidates_device() {
            return self.invalidate(InvalidReason::EndpointNotFound, sink);
        }
        if result.outcome != FetchOutcome::Ok {
            return CycleOutcome::Transient(result.outcome);
        }
        if result.body.is_empty() {
            self.state.last_value = ExtractedValue::absent();
            return CycleOutcome::NoValue;
        }
        sink.emit(&AppEvent::Payload(
            String::from_utf8_lossy(&result.body).into_owned(),
        ));

        // 3. Extract
        let value = match extract::extract(&result.body, &self.key_path) {
            Ok(v) => v,
            Err(ExtractError::EmptyBody) => {
                self.state.last_value = ExtractedValue::absent();
                return CycleOutcome::NoValue;
            }
            Err(e) => {
                warn!("poll: extraction failed: {}", e);
                self.state.last_value = ExtractedValue::absent();
                return self.invalidate(InvalidReason::ValueUnextractable, sink);
            }
        };
        if let Some(source) = value.source {
            sink.emit(&AppEvent::ValueExtracted {
                raw: value.raw.clone(),
                numeric: value.numeric,
                source,
            });
        }

        // 4. Map and sweep
        let angle = actuator::value_to_angle(value.numeric, &self.bounds);
        let report = self
            .state
            .actuator
            .move_to(hw, delay, i32::from(angle), self.speed_dps);
        sink.emit(&AppEvent::Moved {
            from: report.from,
            to: report.to,
            steps: report.steps,
        });

        let numeric = value.numeric;
        self.state.last_value = value;
        CycleOutcome::Displayed {
            value: numeric,
            angle,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_valid(&self) -> bool {
        self.state.valid
    }

    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        self.state.invalid_reason
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.connectivity.state()
    }

    pub fn current_angle(&self) -> u8 {
        self.state.actuator.current_angle()
    }

    pub fn last_value(&self) -> &ExtractedValue {
        &self.state.last_value
    }

    /// Cycles that performed work (excludes `Inert` calls).
    pub fn poll_count(&self) -> u64 {
        self.state.poll_count
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    // ── Internal ──────────────────────────────────────────────

    fn invalidate(&mut self, reason: InvalidReason, sink: &mut impl EventSink) -> CycleOutcome {
        self.state.valid = false;
        self.state.invalid_reason = Some(reason);
        sink.emit(&AppEvent::Invalidated(reason));
        warn!("GaugeService: device invalidated ({:?})", reason);
        CycleOutcome::Invalidated(reason)
    }
}
