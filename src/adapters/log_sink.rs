//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Verbose records are gated by [`DebugFlags`].

use log::{debug, error, info, warn};

use crate::app::events::{AppEvent, InvalidReason};
use crate::app::ports::EventSink;
use crate::config::DebugFlags;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink {
    flags: DebugFlags,
}

impl LogEventSink {
    pub fn new(flags: DebugFlags) -> Self {
        Self { flags }
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Booted { angle } => {
                info!("BOOT  | self-test done, arm at {}\u{00b0}", angle);
            }
            AppEvent::ConnectionChanged { from, to } => {
                info!("NET   | {} -> {}", from, to);
            }
            AppEvent::FetchCompleted {
                status_code,
                outcome,
                body_len,
            } => {
                info!(
                    "FETCH | status={} outcome={} body={}B",
                    status_code, outcome, body_len
                );
            }
            AppEvent::Payload(text) => {
                if self.flags.show_payload {
                    info!("BODY  | {}", text.trim_end());
                } else {
                    debug!("BODY  | {}", text.trim_end());
                }
            }
            AppEvent::ValueExtracted {
                raw,
                numeric,
                source,
            } => {
                info!("VALUE | raw={:?} numeric={} via={:?}", raw, numeric, source);
            }
            AppEvent::Moved { from, to, steps } => {
                if self.flags.show_servo_moves {
                    info!("MOVE  | {}\u{00b0} -> {}\u{00b0} ({} steps)", from, to, steps);
                } else {
                    debug!("MOVE  | {}\u{00b0} -> {}\u{00b0} ({} steps)", from, to, steps);
                }
            }
            AppEvent::Invalidated(reason) => {
                let why = match reason {
                    InvalidReason::EndpointNotFound => "endpoint returned 404",
                    InvalidReason::ValueUnextractable => "value could not be extracted",
                };
                warn!("INVAL | device disabled: {}", why);
            }
            AppEvent::Halted => {
                error!("HALT  | network never came up, entering diagnostic flash");
            }
        }
    }
}
