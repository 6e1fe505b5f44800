//! Outbound application events.
//!
//! The [`GaugeService`](super::service::GaugeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port at each pipeline stage.

use crate::extract::ExtractSource;
use crate::net::connectivity::ConnectionState;
use crate::net::fetcher::FetchOutcome;

/// Why the device stopped polling for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// The server answered 404 for the configured resource.
    EndpointNotFound,
    /// Neither parser could pull a number out of the payload.
    ValueUnextractable,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Boot self-test finished; arm parked at the given angle.
    Booted { angle: u8 },

    /// Connectivity state changed.
    ConnectionChanged {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// A fetch attempt finished.
    FetchCompleted {
        status_code: u16,
        outcome: FetchOutcome,
        body_len: usize,
    },

    /// The raw body line that will be handed to the extractor.
    Payload(String),

    /// A value was extracted.
    ValueExtracted {
        raw: String,
        numeric: f64,
        source: ExtractSource,
    },

    /// The arm swept to a new position.
    Moved { from: u8, to: u8, steps: u16 },

    /// The device is permanently invalid.
    Invalidated(InvalidReason),

    /// Connectivity never came up; normal operation stops.
    Halted,
}
