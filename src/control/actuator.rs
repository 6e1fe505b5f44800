//! Speed-controlled servo arm positioning.
//!
//! The arm never jumps: [`ActuatorController::move_to`] walks one degree at a
//! time with a fixed per-degree delay so the needle sweeps visibly at the
//! requested angular rate.
//!
//! ## Angle normalisation
//!
//! Requested angles are reduced modulo **181**, not 180, so 180 maps to
//! itself and 181 wraps to 0. This matches the deployed gauges; the range is
//! inclusive `[0, 180]`.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::ports::{Indicator, IndicatorPort, ServoPort};
use crate::config::DisplayBounds;

/// Parking position at boot.
pub const CENTER_ANGLE: u8 = 90;
pub const MAX_ANGLE: u8 = 180;

/// Degrees per second used when the caller passes an out-of-range speed.
pub const DEFAULT_SPEED_DPS: i32 = 90;
pub const MIN_SPEED_DPS: i32 = 1;
pub const MAX_SPEED_DPS: i32 = 360;

/// Reduce any integer to `[0, 180]`.
pub fn normalize_angle(angle: i32) -> u8 {
    angle.rem_euclid(i32::from(MAX_ANGLE) + 1) as u8
}

/// Clamp-by-substitution: speeds outside `[1, 360]` become the default.
pub fn effective_speed(degrees_per_second: i32) -> i32 {
    if (MIN_SPEED_DPS..=MAX_SPEED_DPS).contains(&degrees_per_second) {
        degrees_per_second
    } else {
        DEFAULT_SPEED_DPS
    }
}

/// Milliseconds spent on each one-degree step.
pub fn step_delay_ms(degrees_per_second: i32) -> u32 {
    (1000.0 / f64::from(effective_speed(degrees_per_second))).round() as u32
}

/// Map a domain value onto arm travel.
pub fn value_to_angle(value: f64, bounds: &DisplayBounds) -> u8 {
    if value <= bounds.low() {
        return 0;
    }
    if value >= bounds.high() {
        return MAX_ANGLE;
    }
    let span = bounds.high() - bounds.low();
    (f64::from(MAX_ANGLE) * (value - bounds.low()) / span).round() as u8
}

/// What a single `move_to` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub from: u8,
    pub to: u8,
    pub steps: u16,
    pub step_delay_ms: u32,
}

impl MoveReport {
    pub fn total_delay_ms(&self) -> u32 {
        u32::from(self.steps) * self.step_delay_ms
    }
}

/// Sole owner of the arm position.
pub struct ActuatorController {
    current: u8,
}

impl Default for ActuatorController {
    fn default() -> Self {
        Self::new()
    }
}

impl ActuatorController {
    pub fn new() -> Self {
        Self {
            current: CENTER_ANGLE,
        }
    }

    pub fn current_angle(&self) -> u8 {
        self.current
    }

    /// Drive the servo to the tracked position without sweeping.
    ///
    /// Used once at boot so the hardware agrees with `current_angle`.
    pub fn sync(&self, servo: &mut impl ServoPort) {
        servo.write_angle(self.current);
    }

    /// Sweep to `angle` at `degrees_per_second`.
    ///
    /// The activity indicator is lit for the duration of a non-empty sweep.
    /// Each step sleeps first, then commits the new angle.
    pub fn move_to(
        &mut self,
        hw: &mut (impl ServoPort + IndicatorPort),
        delay: &mut impl DelayNs,
        angle: i32,
        degrees_per_second: i32,
    ) -> MoveReport {
        let target = normalize_angle(angle);
        let step_ms = step_delay_ms(degrees_per_second);
        let from = self.current;

        if target == from {
            debug!("servo: already at {}", target);
            return MoveReport {
                from,
                to: target,
                steps: 0,
                step_delay_ms: step_ms,
            };
        }

        hw.set_indicator(Indicator::Activity, true);
        let mut steps: u16 = 0;
        while self.current != target {
            delay.delay_ms(step_ms);
            if target > self.current {
                self.current += 1;
            } else {
                self.current -= 1;
            }
            hw.write_angle(self.current);
            steps += 1;
        }
        hw.set_indicator(Indicator::Activity, false);

        MoveReport {
            from,
            to: target,
            steps,
            step_delay_ms: step_ms,
        }
    }

    pub fn move_to_default(
        &mut self,
        hw: &mut (impl ServoPort + IndicatorPort),
        delay: &mut impl DelayNs,
        angle: i32,
    ) -> MoveReport {
        self.move_to(hw, delay, angle, DEFAULT_SPEED_DPS)
    }
}
