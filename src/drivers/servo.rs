//! Hobby servo on a 50 Hz PWM channel.
//!
//! Angle maps linearly onto pulse width:
//!
//! ```text
//!   0°  → 500 µs
//!  90°  → 1500 µs
//! 180°  → 2500 µs      (frame = 20 000 µs)
//! ```
//!
//! Generic over [`SetDutyCycle`] so the same driver runs on the ESP-IDF
//! LEDC channel and on a mock in host tests.

use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::ServoPort;
use crate::pins;

const FRAME_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;

/// Pulse width for `degrees`, clamped to `[0, 180]`.
pub fn pulse_width_us(degrees: u8) -> u32 {
    let d = u32::from(degrees.min(180));
    let span = pins::SERVO_PULSE_MAX_US - pins::SERVO_PULSE_MIN_US;
    pins::SERVO_PULSE_MIN_US + d * span / 180
}

pub struct ServoDriver<P> {
    pwm: P,
    last: Option<u8>,
}

impl<P: SetDutyCycle> ServoDriver<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, last: None }
    }

    /// Last angle successfully written, if any.
    pub fn last_angle(&self) -> Option<u8> {
        self.last
    }

    pub fn set_angle(&mut self, degrees: u8) -> Result<(), P::Error> {
        let pulse = pulse_width_us(degrees);
        self.pwm
            .set_duty_cycle_fraction(pulse as u16, FRAME_US as u16)?;
        self.last = Some(degrees.min(180));
        Ok(())
    }
}

impl<P: SetDutyCycle> ServoPort for ServoDriver<P> {
    fn write_angle(&mut self, degrees: u8) {
        if let Err(e) = self.set_angle(degrees) {
            warn!("servo: duty write for {}° failed: {:?}", degrees, e);
        }
    }
}
